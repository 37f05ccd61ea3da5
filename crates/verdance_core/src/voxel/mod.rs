//! Voxel storage.
//!
//! Cells are addressed by integer index; cell `i` on an axis covers world
//! coordinates `[i * voxel_size, (i + 1) * voxel_size)`.

mod chunk;
mod region;
mod volume;

pub use chunk::{ChunkCoord, Material, Voxel, VoxelChunk, CHUNK_SIZE, CHUNK_VOLUME};
pub use region::{RegionBuffer, VoxelRegion};
pub use volume::{ChunkedVolume, RayFilter, RayHit, VoxelVolume};
