//! # VERDANCE Core
//!
//! The two collaborators the terrain pipeline writes into.
//!
//! ## Components
//!
//! - `VoxelVolume`: bulk (material, occupancy) region writes and downward
//!   ray queries, with `ChunkedVolume` as the sparse in-memory store
//! - `SceneContainer` / `ContainerRef`: shared lists of attached objects
//!
//! Neither knows anything about noise, zones or props.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod scene;
pub mod voxel;

pub use error::{VolumeError, VolumeResult};
pub use scene::{
    ContainerRef, Finish, ObjectId, Part, PartShape, PointLight, SceneContainer, SceneObject,
    SceneSink,
};
pub use voxel::{
    ChunkCoord, ChunkedVolume, Material, RayFilter, RayHit, RegionBuffer, Voxel, VoxelChunk,
    VoxelRegion, VoxelVolume, CHUNK_SIZE, CHUNK_VOLUME,
};
