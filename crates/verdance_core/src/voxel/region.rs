//! Cell-space regions and the bulk-write payload.

use super::chunk::{Material, Voxel};
use crate::error::{VolumeError, VolumeResult};

/// Axis-aligned box of cells, `min` inclusive, `max` exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VoxelRegion {
    /// Lowest cell index on each axis.
    pub min: [i32; 3],
    /// One past the highest cell index on each axis.
    pub max: [i32; 3],
}

impl VoxelRegion {
    /// Creates a region from its corners.
    #[inline]
    #[must_use]
    pub const fn new(min: [i32; 3], max: [i32; 3]) -> Self {
        Self { min, max }
    }

    /// Extent along each axis (zero for degenerate axes).
    #[inline]
    #[must_use]
    pub fn size(&self) -> [usize; 3] {
        [0usize, 1, 2].map(|a| (self.max[a] - self.min[a]).max(0) as usize)
    }

    /// Number of cells in the region.
    #[inline]
    #[must_use]
    pub fn volume(&self) -> usize {
        let [x, y, z] = self.size();
        x * y * z
    }

    /// Returns true if the region has zero extent on some axis.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        (0usize..3).any(|a| self.max[a] <= self.min[a])
    }

    /// Returns true if `cell` lies inside the region.
    #[inline]
    #[must_use]
    pub fn contains_cell(&self, cell: [i32; 3]) -> bool {
        (0usize..3).all(|a| cell[a] >= self.min[a] && cell[a] < self.max[a])
    }

    /// Returns true if `other` lies entirely inside this region.
    #[must_use]
    pub fn contains_region(&self, other: &Self) -> bool {
        (0usize..3).all(|a| other.min[a] >= self.min[a] && other.max[a] <= self.max[a])
    }

    /// Overlap of two regions, if any.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let region = Self::new(
            [0usize, 1, 2].map(|a| self.min[a].max(other.min[a])),
            [0usize, 1, 2].map(|a| self.max[a].min(other.max[a])),
        );
        (!region.is_empty()).then_some(region)
    }

    /// Linear index of `cell` inside this region (Z-Y-X order).
    #[inline]
    fn index_of(&self, cell: [i32; 3]) -> usize {
        let [sx, sy, _] = self.size();
        let x = (cell[0] - self.min[0]) as usize;
        let y = (cell[1] - self.min[1]) as usize;
        let z = (cell[2] - self.min[2]) as usize;
        (z * sy + y) * sx + x
    }
}

/// Material + occupancy payload for one bulk region write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionBuffer {
    region: VoxelRegion,
    voxels: Vec<Voxel>,
}

impl RegionBuffer {
    /// Creates a buffer covering `region`, every cell set to `fill`.
    #[must_use]
    pub fn filled(region: VoxelRegion, fill: Voxel) -> Self {
        Self {
            region,
            voxels: vec![fill; region.volume()],
        }
    }

    /// Creates an all-air buffer covering `region`.
    #[must_use]
    pub fn empty(region: VoxelRegion) -> Self {
        Self::filled(region, Voxel::AIR)
    }

    /// Builds a buffer from parallel material and occupancy arrays in
    /// Z-Y-X order.
    ///
    /// # Errors
    ///
    /// Returns `BufferSizeMismatch` if either array length differs from the
    /// region's cell count.
    pub fn from_parts(
        region: VoxelRegion,
        materials: &[Material],
        occupancy: &[f32],
    ) -> VolumeResult<Self> {
        let expected = region.volume();
        for actual in [materials.len(), occupancy.len()] {
            if actual != expected {
                return Err(VolumeError::BufferSizeMismatch { expected, actual });
            }
        }
        let voxels = materials
            .iter()
            .zip(occupancy)
            .map(|(&m, &o)| Voxel::new(m, o))
            .collect();
        Ok(Self { region, voxels })
    }

    /// The region this buffer covers.
    #[inline]
    #[must_use]
    pub const fn region(&self) -> VoxelRegion {
        self.region
    }

    /// Number of cells held.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// Returns true if the buffer holds no cells.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Voxel at an absolute cell index; air outside the region.
    #[inline]
    #[must_use]
    pub fn get(&self, cell: [i32; 3]) -> Voxel {
        if self.region.contains_cell(cell) {
            self.voxels[self.region.index_of(cell)]
        } else {
            Voxel::AIR
        }
    }

    /// Sets the voxel at an absolute cell index. Cells outside the region
    /// are ignored.
    #[inline]
    pub fn set(&mut self, cell: [i32; 3], voxel: Voxel) {
        if self.region.contains_cell(cell) {
            let idx = self.region.index_of(cell);
            self.voxels[idx] = voxel;
        }
    }

    /// Returns true if every cell of `part` is empty.
    #[must_use]
    pub fn is_empty_within(&self, part: &VoxelRegion) -> bool {
        for z in part.min[2]..part.max[2] {
            for y in part.min[1]..part.max[1] {
                for x in part.min[0]..part.max[0] {
                    if !self.get([x, y, z]).is_empty() {
                        return false;
                    }
                }
            }
        }
        true
    }
}
