//! # Terrain Error Types
//!
//! All errors that can occur while validating a configuration or building a
//! world. Placement misses are not errors and never show up here.

use std::path::PathBuf;

use thiserror::Error;
use verdance_core::VolumeError;

use crate::world::BuildStage;

/// Configuration rejected at build entry.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A size, distance or count that must be strictly positive.
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Dotted path of the offending field.
        field: String,
        /// The rejected value.
        value: f64,
    },

    /// A value that must be finite was NaN or infinite.
    #[error("{field} must be finite")]
    NonFinite {
        /// Dotted path of the offending field.
        field: String,
    },

    /// A value outside its allowed range.
    #[error("{field} must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        /// Dotted path of the offending field.
        field: String,
        /// The rejected value.
        value: f64,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// A road or river with no width.
    #[error("path '{path}' has zero width")]
    ZeroWidth {
        /// Path name.
        path: String,
    },

    /// A path needs at least two waypoints to form a segment.
    #[error("path '{path}' has {count} waypoint(s), needs at least 2")]
    TooFewWaypoints {
        /// Path name.
        path: String,
        /// Waypoints supplied.
        count: usize,
    },

    /// A prop density below zero.
    #[error("{zone} {kind} density must not be negative, got {value}")]
    NegativeDensity {
        /// Zone name.
        zone: &'static str,
        /// "tree" or "rock".
        kind: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The vertical range cannot hold any terrain.
    #[error("ceiling_y ({ceiling}) must be above floor_y ({floor})")]
    EmptyVerticalRange {
        /// Configured floor.
        floor: f64,
        /// Configured ceiling.
        ceiling: f64,
    },

    /// A zone rectangle whose minimum corner is not below its maximum.
    #[error("{zone} zone rectangle {min:?}..{max:?} is empty or inverted")]
    InvertedRect {
        /// Zone name.
        zone: &'static str,
        /// Configured minimum corner.
        min: [f64; 2],
        /// Configured maximum corner.
        max: [f64; 2],
    },

    /// Water that would stand above the banks of its channel.
    #[error("{body} water level {water_level} exceeds its depth {max_depth}")]
    WaterAboveBank {
        /// River or lake.
        body: String,
        /// Configured water level.
        water_level: f64,
        /// Configured bed depth.
        max_depth: f64,
    },

    /// TOML could not be parsed into a configuration.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Errors raised while building or editing a world.
#[derive(Error, Debug)]
pub enum TerrainError {
    /// Configuration failed validation; nothing was written.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The volume rejected a write. The pass and the build are aborted.
    #[error("volume write failed during {stage:?}: {source}")]
    Volume {
        /// Stage that issued the write.
        stage: BuildStage,
        /// The rejected write.
        source: VolumeError,
    },

    /// A build was started on a volume that still holds terrain.
    #[error("volume is not empty; destroy the previous world first")]
    VolumeNotEmpty,

    /// A supplied volume uses a different cell size than the configuration.
    #[error("volume voxel size {volume} does not match configured {config}")]
    VoxelSizeMismatch {
        /// Configured `map.voxel_size`.
        config: f64,
        /// The volume's cell size.
        volume: f64,
    },

    /// `flatten_area` was given a square that is degenerate or off the map.
    #[error("cannot flatten {size}-unit square at ({x}, {z})")]
    InvalidFlattenArea {
        /// Requested centre X.
        x: f64,
        /// Requested centre Z.
        z: f64,
        /// Requested edge length.
        size: f64,
    },

    /// `step` was called after the build finished.
    #[error("build already finished")]
    AlreadyFinished,

    /// A background build thread panicked.
    #[error("background build thread panicked")]
    BuildThreadPanicked,
}

/// Result type for terrain operations.
pub type TerrainResult<T> = Result<T, TerrainError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
