//! # Volume Error Types
//!
//! All errors that can occur when writing to or reading from a voxel volume.

use thiserror::Error;

use crate::voxel::VoxelRegion;

/// Errors raised by [`VoxelVolume`](crate::voxel::VoxelVolume) implementations.
///
/// Every variant means the write was rejected as a whole; no cell of the
/// offending region has been touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VolumeError {
    /// The region has zero extent on at least one axis.
    #[error("degenerate region {region:?}")]
    EmptyRegion {
        /// The rejected region.
        region: VoxelRegion,
    },

    /// The region reaches outside the volume.
    #[error("region {region:?} lies outside volume bounds {bounds:?}")]
    OutOfBounds {
        /// The rejected region.
        region: VoxelRegion,
        /// The volume's bounds.
        bounds: VoxelRegion,
    },

    /// Material/occupancy payload does not match the region's cell count.
    #[error("payload holds {actual} cells but region needs {expected}")]
    BufferSizeMismatch {
        /// Cells in the region.
        expected: usize,
        /// Cells supplied.
        actual: usize,
    },
}

/// Result type for volume operations.
pub type VolumeResult<T> = Result<T, VolumeError>;
