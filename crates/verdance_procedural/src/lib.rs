//! # VERDANCE Procedural
//!
//! Deterministic construction of a bounded outdoor map: a zoned height
//! field written into a voxel volume, roads, a river and lakes carved into
//! it, then trees, rocks, road furniture, bridges and boundary walls placed
//! on the result.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: same configuration and seed, same voxels and props
//! 2. **Cooperative**: `WorldBuilder::step` does one bounded unit of work
//! 3. **Volume-agnostic**: any `VoxelVolume` can receive the world
//! 4. **Records first**: props are plain data; scene objects are projected
//!
//! ## Core Components
//!
//! - `HeightField` / `ZoneClassifier`: surface elevation and zones
//! - `VoxelWriter`: chunked terrain fill with fractional occupancy
//! - `RoadCarver` / `ChannelCarver`: road slabs, river and lake basins
//! - `Scatter` / `ExclusionMap`: prop placement by downward rays
//! - `find_crossings` / `place_bridge`: bridges where roads meet the river
//! - `WorldBuilder` / `WorldHandle`: the staged pipeline and its result
//! - `spawn_build`: the pipeline on a worker thread
//!
//! ## Example
//!
//! ```rust,ignore
//! use verdance_procedural::{build, WorldConfig};
//!
//! let mut world = build(WorldConfig::default())?;
//! println!("{} bridges", world.stats().bridges);
//!
//! let report = world.flatten_area(40.0, -40.0, 16.0)?;
//! println!("flattened {} columns at y={}", report.columns, report.height);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod background;
pub mod boundary;
pub mod carve;
pub mod config;
pub mod crossing;
pub mod decorations;
pub mod error;
pub mod geometry;
pub mod height;
pub mod noise;
pub mod placement;
pub mod props;
pub mod terrain;
pub mod world;
pub mod writer;
pub mod zone;

pub use background::{spawn_build, BackgroundBuild, BuildEvent};
pub use boundary::{boundary_walls, BoundaryWall, Edge};
pub use carve::{CarveStats, ChannelCarver, ChannelProfile, RoadCarver};
pub use config::{
    BoundaryConfig, BridgeConfig, CoreZone, LakeConfig, MapConfig, NoiseConfig, Octave, OpenZone,
    PacingConfig, PlacementConfig, RestrictedZone, RiverPath, RoadPath, RoadsConfig, WorldConfig,
    ZoneDensity, ZonesConfig,
};
pub use crossing::{find_crossings, place_bridge, Crossing};
pub use decorations::{find_junctions, place_signposts, place_torches, Junction};
pub use error::{ConfigError, ConfigResult, TerrainError, TerrainResult};
pub use height::HeightField;
pub use noise::{SimplexNoise, WorldSeed};
pub use placement::{place_on_surface, surface_height, ExclusionMap, NaturalProp, Scatter, ScatterOutcome, SpacingHash};
pub use props::{PlacedProp, PropKind, PropModel, TreeSpecies};
pub use terrain::{Terrain, VoxelGrid};
pub use world::{
    build, build_with_volume, BuildStage, BuildStats, BuildStep, FlattenReport, WorldBuilder,
    WorldHandle,
};
pub use writer::{VoxelWriter, WriterStep};
pub use zone::{Zone, ZoneClassifier};
