//! Shared terrain context.
//!
//! [`Terrain`] bundles what every pass needs: the height field, the zone
//! classifier and the voxel grid. It is immutable once built.

use verdance_core::{Material, RegionBuffer, Voxel, VoxelRegion};

use crate::config::{MapConfig, WorldConfig};
use crate::geometry::{Point2, Rect};
use crate::height::HeightField;
use crate::zone::ZoneClassifier;

/// Mapping between world units and cell indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelGrid {
    /// Cell edge length.
    pub voxel_size: f64,
    /// Cells covering the map and the vertical range.
    pub bounds: VoxelRegion,
}

impl VoxelGrid {
    /// Grid for a map configuration.
    #[must_use]
    pub fn from_map(map: &MapConfig) -> Self {
        let s = map.voxel_size;
        let [hx, hz] = map.half_extents();
        Self {
            voxel_size: s,
            bounds: VoxelRegion::new(
                [
                    (-hx / s).floor() as i32,
                    (map.floor_y / s).floor() as i32,
                    (-hz / s).floor() as i32,
                ],
                [
                    (hx / s).ceil() as i32,
                    (map.ceiling_y / s).ceil() as i32,
                    (hz / s).ceil() as i32,
                ],
            ),
        }
    }

    /// Cell index containing world coordinate `v`.
    #[inline]
    #[must_use]
    pub fn cell_of(&self, v: f64) -> i32 {
        (v / self.voxel_size).floor() as i32
    }

    /// Planar centre of column `(cx, cz)`.
    #[inline]
    #[must_use]
    pub fn column_center(&self, cx: i32, cz: i32) -> Point2 {
        [
            (f64::from(cx) + 0.5) * self.voxel_size,
            (f64::from(cz) + 0.5) * self.voxel_size,
        ]
    }

    /// Returns true if column `(cx, cz)` lies inside the grid.
    #[inline]
    #[must_use]
    pub fn has_column(&self, cx: i32, cz: i32) -> bool {
        cx >= self.bounds.min[0] && cx < self.bounds.max[0] && cz >= self.bounds.min[2] && cz < self.bounds.max[2]
    }

    /// Columns whose cells overlap `rect`, clipped to the grid, as
    /// `([min_x, min_z], [max_x, max_z])` with exclusive maxima.
    #[must_use]
    pub fn columns_in(&self, rect: &Rect) -> ([i32; 2], [i32; 2]) {
        let b = &self.bounds;
        let min = [
            self.cell_of(rect.min[0]).max(b.min[0]),
            self.cell_of(rect.min[1]).max(b.min[2]),
        ];
        let max = [
            (self.cell_of(rect.max[0]) + 1).min(b.max[0]),
            (self.cell_of(rect.max[1]) + 1).min(b.max[2]),
        ];
        (min, [max[0].max(min[0]), max[1].max(min[1])])
    }

    /// Cells covering world heights `[low, high)`, clipped to the grid.
    /// The flag is true if clipping shortened the range.
    #[must_use]
    pub fn cells_between(&self, low: f64, high: f64) -> (i32, i32, bool) {
        let b = &self.bounds;
        let lo = self.cell_of(low);
        let hi = self.cell_of(high) + 1;
        let clipped = lo < b.min[1] || hi > b.max[1];
        let lo = lo.clamp(b.min[1], b.max[1]);
        let hi = hi.clamp(lo, b.max[1]);
        (lo, hi, clipped)
    }

    /// Occupancy of cell `cy` below a surface at world height `surface`.
    ///
    /// Equals `clamp(0.5 + depth / size, 0, 1)` where `depth` is how far the
    /// cell centre lies below the surface, so a downward ray reading
    /// `cell_bottom + occupancy * size` recovers the surface.
    #[inline]
    #[must_use]
    pub fn occupancy(&self, cy: i32, surface: f64) -> f32 {
        let depth = surface - (f64::from(cy) + 0.5) * self.voxel_size;
        (0.5 + depth / self.voxel_size).clamp(0.0, 1.0) as f32
    }

    /// World height of the centre of cell `cy`.
    #[inline]
    #[must_use]
    pub fn cell_center_y(&self, cy: i32) -> f64 {
        (f64::from(cy) + 0.5) * self.voxel_size
    }
}

/// Everything the passes read but never write.
pub struct Terrain {
    /// Ground elevation.
    pub height: HeightField,
    /// Zone lookup.
    pub zones: ZoneClassifier,
    /// Cell mapping.
    pub grid: VoxelGrid,
    surface_layer: f64,
    soil_depth: f64,
}

impl Terrain {
    /// Builds the context for a configuration.
    #[must_use]
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            height: HeightField::new(config),
            zones: ZoneClassifier::new(config),
            grid: VoxelGrid::from_map(&config.map),
            surface_layer: config.map.surface_layer,
            soil_depth: config.map.soil_depth,
        }
    }

    /// Ground contents of cell `cy` in a column whose surface sits at
    /// `surface` and is topped with `top` material.
    #[must_use]
    pub fn ground_voxel(&self, cy: i32, surface: f64, top: Material) -> Voxel {
        let occupancy = self.grid.occupancy(cy, surface);
        if occupancy <= 0.0 {
            return Voxel::AIR;
        }
        let depth = surface - self.grid.cell_center_y(cy);
        let material = if depth < self.surface_layer {
            top
        } else if depth < self.surface_layer + self.soil_depth {
            Material::Ground
        } else {
            Material::Rock
        };
        Voxel::new(material, occupancy)
    }

    /// Writes natural ground for column `(cx, cz)` into every cell of
    /// `buffer`'s vertical range.
    pub fn fill_column(&self, buffer: &mut RegionBuffer, cx: i32, cz: i32, surface: f64, top: Material) {
        let region = buffer.region();
        for cy in region.min[1]..region.max[1] {
            buffer.set([cx, cy, cz], self.ground_voxel(cy, surface, top));
        }
    }
}
