//! Voxel chunk data structures.
//!
//! Chunks are 16x16x16 cells. Each cell packs a material id and a quantised
//! occupancy fraction into two bytes.

use bytemuck::{Pod, Zeroable};

use super::region::VoxelRegion;

/// Chunk dimension - 16 cells per axis.
pub const CHUNK_SIZE: usize = 16;

/// Total cells per chunk.
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

/// Terrain materials understood by the volume.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Material {
    /// Empty space.
    #[default]
    Air = 0,
    /// Short grass (core/safe zone surface).
    Grass = 1,
    /// Long grass (open wilderness surface).
    LeafyGrass = 2,
    /// Bare soil.
    Ground = 3,
    /// Subsurface rock.
    Rock = 4,
    /// Dark volcanic rock (restricted zone surface).
    Basalt = 5,
    /// River and lake beds.
    Mud = 6,
    /// Road surface.
    Cobblestone = 8,
    /// Water fill.
    Water = 9,
}

impl Material {
    /// Converts from u8; unknown ids map to `Air`.
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Grass,
            2 => Self::LeafyGrass,
            3 => Self::Ground,
            4 => Self::Rock,
            5 => Self::Basalt,
            6 => Self::Mud,
            8 => Self::Cobblestone,
            9 => Self::Water,
            _ => Self::Air,
        }
    }

    /// Returns true for empty space.
    #[inline]
    #[must_use]
    pub const fn is_air(self) -> bool {
        matches!(self, Self::Air)
    }

    /// Returns true for water.
    #[inline]
    #[must_use]
    pub const fn is_water(self) -> bool {
        matches!(self, Self::Water)
    }
}

/// A single voxel - packed into 2 bytes.
///
/// Layout:
/// - Byte 0: Material ID
/// - Byte 1: Occupancy, 0 = empty, 255 = completely filled
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable, PartialEq, Eq)]
pub struct Voxel {
    /// Material ID.
    pub material: u8,
    /// Quantised occupancy.
    pub occupancy: u8,
}

impl Voxel {
    /// Air voxel - completely empty.
    pub const AIR: Self = Self { material: 0, occupancy: 0 };

    /// Creates a voxel of `material` filled to `occupancy` (clamped to [0,1]).
    ///
    /// Air is always stored with zero occupancy.
    #[inline]
    #[must_use]
    pub fn new(material: Material, occupancy: f32) -> Self {
        if material.is_air() {
            return Self::AIR;
        }
        let occupancy = if occupancy.is_nan() { 0.0 } else { occupancy.clamp(0.0, 1.0) };
        Self {
            material: material as u8,
            occupancy: (occupancy * 255.0).round() as u8,
        }
    }

    /// Creates a completely filled voxel.
    #[inline]
    #[must_use]
    pub fn solid(material: Material) -> Self {
        Self::new(material, 1.0)
    }

    /// Returns the material.
    #[inline]
    #[must_use]
    pub const fn material(self) -> Material {
        Material::from_u8(self.material)
    }

    /// Returns the occupancy fraction in [0, 1].
    #[inline]
    #[must_use]
    pub fn occupancy(self) -> f32 {
        f32::from(self.occupancy) / 255.0
    }

    /// Returns true if nothing occupies this cell.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.material == 0 || self.occupancy == 0
    }
}

/// Chunk coordinate in chunk space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Converts a cell index to the chunk containing it.
    #[inline]
    #[must_use]
    pub const fn from_cell(cell: [i32; 3]) -> Self {
        Self::new(
            cell[0].div_euclid(CHUNK_SIZE as i32),
            cell[1].div_euclid(CHUNK_SIZE as i32),
            cell[2].div_euclid(CHUNK_SIZE as i32),
        )
    }

    /// The cells covered by this chunk.
    #[must_use]
    pub const fn region(self) -> VoxelRegion {
        let s = CHUNK_SIZE as i32;
        VoxelRegion::new(
            [self.x * s, self.y * s, self.z * s],
            [(self.x + 1) * s, (self.y + 1) * s, (self.z + 1) * s],
        )
    }
}

/// A chunk of voxels - 16x16x16 = 4,096 cells.
///
/// Cells are stored in Z-Y-X order.
#[derive(Clone)]
pub struct VoxelChunk {
    /// Layout: voxels[z * CHUNK_SIZE * CHUNK_SIZE + y * CHUNK_SIZE + x]
    voxels: Box<[Voxel; CHUNK_VOLUME]>,

    /// Number of non-empty cells (for quick empty checks).
    filled_count: u32,
}

impl Default for VoxelChunk {
    fn default() -> Self {
        Self::new()
    }
}

impl VoxelChunk {
    /// Creates a new empty chunk.
    #[must_use]
    pub fn new() -> Self {
        Self {
            voxels: Box::new([Voxel::AIR; CHUNK_VOLUME]),
            filled_count: 0,
        }
    }

    /// Returns true if the chunk holds nothing but empty cells.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.filled_count == 0
    }

    /// Calculates the linear index for a local position.
    #[inline]
    const fn index(x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < CHUNK_SIZE);
        debug_assert!(y < CHUNK_SIZE);
        debug_assert!(z < CHUNK_SIZE);
        z * CHUNK_SIZE * CHUNK_SIZE + y * CHUNK_SIZE + x
    }

    /// Gets a voxel at the given local position.
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds (debug builds only).
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Voxel {
        self.voxels[Self::index(x, y, z)]
    }

    /// Sets a voxel at the given local position.
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds (debug builds only).
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, voxel: Voxel) {
        let idx = Self::index(x, y, z);
        let old = self.voxels[idx];

        if !old.is_empty() && voxel.is_empty() {
            self.filled_count -= 1;
        } else if old.is_empty() && !voxel.is_empty() {
            self.filled_count += 1;
        }

        self.voxels[idx] = voxel;
    }

    /// Returns the voxel data as a byte slice for mesher/GPU upload.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.voxels[..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voxel_packing() {
        let voxel = Voxel::new(Material::Grass, 0.5);
        assert_eq!(voxel.material(), Material::Grass);
        assert!((voxel.occupancy() - 0.5).abs() < 0.01);
        assert!(!voxel.is_empty());
    }

    #[test]
    fn test_air_never_occupied() {
        let voxel = Voxel::new(Material::Air, 1.0);
        assert_eq!(voxel, Voxel::AIR);
        assert!(voxel.is_empty());
    }

    #[test]
    fn test_occupancy_clamped() {
        assert_eq!(Voxel::new(Material::Rock, 4.0).occupancy, 255);
        assert_eq!(Voxel::new(Material::Rock, -1.0).occupancy, 0);
        assert!(Voxel::new(Material::Rock, -1.0).is_empty());
    }

    #[test]
    fn test_chunk_coord_from_cell() {
        assert_eq!(ChunkCoord::from_cell([0, 0, 0]), ChunkCoord::new(0, 0, 0));
        assert_eq!(ChunkCoord::from_cell([15, 15, 15]), ChunkCoord::new(0, 0, 0));
        assert_eq!(ChunkCoord::from_cell([16, -1, -16]), ChunkCoord::new(1, -1, -1));
        assert_eq!(ChunkCoord::from_cell([-17, 0, 0]), ChunkCoord::new(-2, 0, 0));
    }

    #[test]
    fn test_chunk_operations() {
        let mut chunk = VoxelChunk::new();
        assert!(chunk.is_empty());

        chunk.set(0, 0, 0, Voxel::solid(Material::Rock));
        chunk.set(0, 0, 0, Voxel::solid(Material::Mud));
        assert!(!chunk.is_empty());
        assert_eq!(chunk.get(0, 0, 0).material(), Material::Mud);

        chunk.set(0, 0, 0, Voxel::AIR);
        assert!(chunk.is_empty());
        assert_eq!(chunk.as_bytes().len(), CHUNK_VOLUME * 2);
    }
}
