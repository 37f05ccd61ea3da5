//! Voxel volume management.
//!
//! [`VoxelVolume`] is the seam between the generator and whatever stores the
//! terrain. [`ChunkedVolume`] is the in-memory implementation: a sparse map
//! of 16³ chunks, allocated on first non-empty write.

use std::collections::HashMap;

use super::chunk::{ChunkCoord, Voxel, VoxelChunk, CHUNK_SIZE};
use super::region::{RegionBuffer, VoxelRegion};
use crate::error::{VolumeError, VolumeResult};

/// Options for downward ray queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RayFilter {
    /// Pass through water cells instead of stopping on them.
    pub ignore_water: bool,
}

impl RayFilter {
    /// Stops on every non-empty cell.
    pub const ALL: Self = Self { ignore_water: false };
    /// Passes through water, stopping on the bed below.
    pub const IGNORE_WATER: Self = Self { ignore_water: true };
}

/// First intersection of a downward ray with the volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World-space hit point.
    pub position: [f64; 3],
    /// Cell that stopped the ray.
    pub cell: [i32; 3],
    /// Contents of that cell.
    pub voxel: Voxel,
    /// Distance travelled from the ray origin.
    pub distance: f64,
}

/// A terrain-like volume of fixed-size cells.
///
/// Cell `i` on an axis spans world coordinates `[i * size, (i + 1) * size)`.
pub trait VoxelVolume {
    /// Edge length of one cell in world units.
    fn voxel_size(&self) -> f64;

    /// Cells that may be written.
    fn bounds(&self) -> VoxelRegion;

    /// Contents of one cell; air outside the bounds.
    fn voxel(&self, cell: [i32; 3]) -> Voxel;

    /// Replaces every cell of `buffer.region()` with the buffer's contents.
    ///
    /// # Errors
    ///
    /// Rejects degenerate or out-of-bounds regions without touching any cell.
    fn write_region(&mut self, buffer: &RegionBuffer) -> VolumeResult<()>;

    /// Copies the cells of `region` into a new buffer.
    ///
    /// # Errors
    ///
    /// Rejects degenerate or out-of-bounds regions.
    fn read_region(&self, region: VoxelRegion) -> VolumeResult<RegionBuffer>;

    /// Returns true if no cell holds anything.
    fn is_empty(&self) -> bool;

    /// Removes all content.
    fn clear(&mut self);

    /// Cell containing a world-space point.
    fn cell_at(&self, x: f64, y: f64, z: f64) -> [i32; 3] {
        let size = self.voxel_size();
        [
            (x / size).floor() as i32,
            (y / size).floor() as i32,
            (z / size).floor() as i32,
        ]
    }

    /// Casts a ray straight down from `(x, from_y, z)` for at most
    /// `max_distance` world units.
    ///
    /// The hit height inside a partially occupied cell is
    /// `cell_bottom + occupancy * size`, which reproduces the surface the
    /// occupancy was derived from.
    fn raycast_down(
        &self,
        x: f64,
        z: f64,
        from_y: f64,
        max_distance: f64,
        filter: RayFilter,
    ) -> Option<RayHit> {
        let size = self.voxel_size();
        let bounds = self.bounds();
        let [cx, _, cz] = self.cell_at(x, from_y, z);
        if cx < bounds.min[0] || cx >= bounds.max[0] || cz < bounds.min[2] || cz >= bounds.max[2] {
            return None;
        }

        let bottom_y = from_y - max_distance;
        let lowest = ((bottom_y / size).floor() as i32).max(bounds.min[1]);
        let mut cy = ((from_y / size).floor() as i32).min(bounds.max[1] - 1);

        while cy >= lowest {
            let voxel = self.voxel([cx, cy, cz]);
            let passes = voxel.is_empty() || (filter.ignore_water && voxel.material().is_water());
            if !passes {
                let surface = (f64::from(cy) + f64::from(voxel.occupancy())) * size;
                let hit_y = surface.min(from_y);
                if hit_y < bottom_y {
                    return None;
                }
                return Some(RayHit {
                    position: [x, hit_y, z],
                    cell: [cx, cy, cz],
                    voxel,
                    distance: from_y - hit_y,
                });
            }
            cy -= 1;
        }
        None
    }
}

/// Sparse, chunked in-memory volume.
///
/// Single writer during generation; read access afterwards can be shared
/// freely (`&ChunkedVolume` is `Sync`).
#[derive(Clone)]
pub struct ChunkedVolume {
    /// World units per cell edge.
    voxel_size: f64,
    /// Writable cells.
    bounds: VoxelRegion,
    /// Chunks indexed by coordinate. Missing chunks are all air.
    chunks: HashMap<ChunkCoord, VoxelChunk>,
    /// Region writes accepted since creation or the last `clear`.
    writes: u64,
}

impl ChunkedVolume {
    /// Creates an empty volume.
    #[must_use]
    pub fn new(bounds: VoxelRegion, voxel_size: f64) -> Self {
        Self {
            voxel_size,
            bounds,
            chunks: HashMap::new(),
            writes: 0,
        }
    }

    /// Number of allocated chunks.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Region writes accepted so far.
    #[must_use]
    pub const fn write_count(&self) -> u64 {
        self.writes
    }

    /// Coordinates of all allocated chunks.
    #[must_use]
    pub fn chunk_coords(&self) -> Vec<ChunkCoord> {
        self.chunks.keys().copied().collect()
    }

    /// Raw bytes of one chunk for mesher/GPU upload.
    #[must_use]
    pub fn chunk_bytes(&self, coord: ChunkCoord) -> Option<&[u8]> {
        self.chunks.get(&coord).map(VoxelChunk::as_bytes)
    }

    fn check_region(&self, region: VoxelRegion) -> VolumeResult<()> {
        if region.is_empty() {
            return Err(VolumeError::EmptyRegion { region });
        }
        if !self.bounds.contains_region(&region) {
            return Err(VolumeError::OutOfBounds {
                region,
                bounds: self.bounds,
            });
        }
        Ok(())
    }
}

impl VoxelVolume for ChunkedVolume {
    fn voxel_size(&self) -> f64 {
        self.voxel_size
    }

    fn bounds(&self) -> VoxelRegion {
        self.bounds
    }

    fn voxel(&self, cell: [i32; 3]) -> Voxel {
        let coord = ChunkCoord::from_cell(cell);
        let s = CHUNK_SIZE as i32;
        self.chunks.get(&coord).map_or(Voxel::AIR, |chunk| {
            chunk.get(
                cell[0].rem_euclid(s) as usize,
                cell[1].rem_euclid(s) as usize,
                cell[2].rem_euclid(s) as usize,
            )
        })
    }

    fn write_region(&mut self, buffer: &RegionBuffer) -> VolumeResult<()> {
        let region = buffer.region();
        self.check_region(region)?;
        if buffer.len() != region.volume() {
            return Err(VolumeError::BufferSizeMismatch {
                expected: region.volume(),
                actual: buffer.len(),
            });
        }

        let lo = ChunkCoord::from_cell(region.min);
        let hi = ChunkCoord::from_cell([region.max[0] - 1, region.max[1] - 1, region.max[2] - 1]);

        for cz in lo.z..=hi.z {
            for cy in lo.y..=hi.y {
                for cx in lo.x..=hi.x {
                    let coord = ChunkCoord::new(cx, cy, cz);
                    let chunk_region = coord.region();
                    let Some(part) = chunk_region.intersect(&region) else {
                        continue;
                    };
                    // Clearing cells of a chunk that was never allocated is a no-op.
                    if !self.chunks.contains_key(&coord) && buffer.is_empty_within(&part) {
                        continue;
                    }

                    let chunk = self
                        .chunks
                        .entry(coord)
                        .or_insert_with(VoxelChunk::new);
                    for z in part.min[2]..part.max[2] {
                        for y in part.min[1]..part.max[1] {
                            for x in part.min[0]..part.max[0] {
                                chunk.set(
                                    (x - chunk_region.min[0]) as usize,
                                    (y - chunk_region.min[1]) as usize,
                                    (z - chunk_region.min[2]) as usize,
                                    buffer.get([x, y, z]),
                                );
                            }
                        }
                    }
                    let now_empty = chunk.is_empty();
                    if now_empty {
                        self.chunks.remove(&coord);
                    }
                }
            }
        }

        self.writes += 1;
        Ok(())
    }

    fn read_region(&self, region: VoxelRegion) -> VolumeResult<RegionBuffer> {
        self.check_region(region)?;
        let mut buffer = RegionBuffer::empty(region);
        for z in region.min[2]..region.max[2] {
            for y in region.min[1]..region.max[1] {
                for x in region.min[0]..region.max[0] {
                    buffer.set([x, y, z], self.voxel([x, y, z]));
                }
            }
        }
        Ok(buffer)
    }

    fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    fn clear(&mut self) {
        self.chunks.clear();
        self.writes = 0;
    }
}
