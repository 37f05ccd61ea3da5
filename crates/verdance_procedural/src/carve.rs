//! # Path Carvers
//!
//! Roads and river/lake channels are cut into the volume by walking each
//! polyline segment in fixed steps and sweeping a perpendicular
//! cross-section at every step. Every column the sweep touches gets a
//! vertical plan; plans are grouped per 16x16-column tile and applied as a
//! read-modify-write of one region each.
//!
//! Carves are idempotent: re-carving a column writes the same cells.

use std::collections::BTreeMap;

use verdance_core::{Material, RegionBuffer, Voxel, VolumeResult, VoxelRegion, VoxelVolume, CHUNK_SIZE};

use crate::config::{LakeConfig, RiverPath, RoadsConfig};
use crate::geometry::{direction, distance, project_onto_segment, Point2, Rect};
use crate::terrain::{Terrain, VoxelGrid};

/// Work done by one carve call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CarveStats {
    /// Columns rewritten.
    pub columns: usize,
    /// Region writes issued.
    pub writes: usize,
}

impl std::ops::AddAssign for CarveStats {
    fn add_assign(&mut self, rhs: Self) {
        self.columns += rhs.columns;
        self.writes += rhs.writes;
    }
}

/// Parabolic channel cross-section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelProfile {
    /// Half the channel width (or the lake radius).
    pub half_width: f64,
    /// Bed depth below the bank at the centre.
    pub max_depth: f64,
    /// Water surface above the deepest point of the bed.
    pub water_level: f64,
}

impl ChannelProfile {
    /// Profile of a river.
    #[must_use]
    pub fn river(river: &RiverPath) -> Self {
        Self {
            half_width: river.width * 0.5,
            max_depth: river.max_depth,
            water_level: river.water_level,
        }
    }

    /// Profile of a lake, applied radially.
    #[must_use]
    pub fn lake(lake: &LakeConfig) -> Self {
        Self {
            half_width: lake.radius,
            max_depth: lake.max_depth,
            water_level: lake.water_level,
        }
    }

    /// Bed depth below the bank at lateral offset `w` from the centre:
    /// `max_depth * (1 - (w / half_width)^2)`, zero outside the channel.
    #[must_use]
    pub fn depth_at(&self, w: f64) -> f64 {
        let r = w.abs() / self.half_width;
        if r >= 1.0 {
            0.0
        } else {
            self.max_depth * (1.0 - r * r)
        }
    }

    /// Water surface for a bank at `bank`.
    #[must_use]
    pub fn water_surface(&self, bank: f64) -> f64 {
        bank - self.max_depth + self.water_level
    }
}

/// A column reached by a cross-section sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CoveredColumn {
    cell: [i32; 2],
    /// Distance from the column centre to the centreline.
    offset: f64,
    /// Closest centreline point.
    foot: Point2,
}

/// What to write into a column.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Layers {
    /// Road slab topped at `surface`, open above.
    Road { surface: f64 },
    /// Bed up to `floor`, water up to `water`, open above.
    Channel { floor: f64, water: f64 },
}

impl Layers {
    fn voxel(self, grid: &VoxelGrid, cy: i32) -> Voxel {
        match self {
            Self::Road { surface } => {
                let occ = grid.occupancy(cy, surface);
                if occ > 0.0 {
                    Voxel::new(Material::Cobblestone, occ)
                } else {
                    Voxel::AIR
                }
            }
            Self::Channel { floor, water } => {
                let bed = grid.occupancy(cy, floor);
                if bed > 0.0 {
                    return Voxel::new(Material::Mud, bed);
                }
                let fill = grid.occupancy(cy, water);
                if fill > 0.0 {
                    Voxel::new(Material::Water, fill)
                } else {
                    Voxel::AIR
                }
            }
        }
    }
}

/// Vertical rewrite of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ColumnPlan {
    cell: [i32; 2],
    /// Cell range `[low, high)`.
    cells: (i32, i32),
    layers: Layers,
}

/// Cuts road slabs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadCarver {
    width: f64,
    step: f64,
    clearance: f64,
    slab_thickness: f64,
}

impl RoadCarver {
    /// Carver for a road of `width` using the network parameters.
    #[must_use]
    pub fn new(width: f64, roads: &RoadsConfig) -> Self {
        Self {
            width,
            step: roads.step,
            clearance: roads.clearance,
            slab_thickness: roads.slab_thickness,
        }
    }

    /// Carves segment `a -> b`.
    ///
    /// Each covered column gets a road slab whose top sits at the height
    /// field's elevation at the column centre, with open space up to
    /// `clearance` above it.
    ///
    /// # Errors
    ///
    /// Propagates volume write failures.
    pub fn carve_segment<V: VoxelVolume + ?Sized>(
        &self,
        terrain: &Terrain,
        volume: &mut V,
        a: Point2,
        b: Point2,
    ) -> VolumeResult<CarveStats> {
        let grid = &terrain.grid;
        let plans: Vec<ColumnPlan> = sweep_segment(grid, a, b, self.width * 0.5, self.step)
            .into_iter()
            .filter_map(|column| {
                let [x, z] = grid.column_center(column.cell[0], column.cell[1]);
                let surface = terrain.height.height(x, z);
                let (lo, hi, _) =
                    grid.cells_between(surface - self.slab_thickness, surface + self.clearance);
                (hi > lo).then_some(ColumnPlan {
                    cell: column.cell,
                    cells: (lo, hi),
                    layers: Layers::Road { surface },
                })
            })
            .collect();
        apply_plans(grid, volume, &plans)
    }
}

/// Cuts parabolic river and lake channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelCarver {
    profile: ChannelProfile,
    step: f64,
}

impl ChannelCarver {
    /// Carver for `profile`, sweeping in `step` increments.
    #[must_use]
    pub const fn new(profile: ChannelProfile, step: f64) -> Self {
        Self { profile, step }
    }

    /// The cross-section.
    #[must_use]
    pub const fn profile(&self) -> ChannelProfile {
        self.profile
    }

    /// Carves river segment `a -> b`. The bank is the height field at the
    /// closest centreline point.
    ///
    /// # Errors
    ///
    /// Propagates volume write failures.
    pub fn carve_segment<V: VoxelVolume + ?Sized>(
        &self,
        terrain: &Terrain,
        volume: &mut V,
        a: Point2,
        b: Point2,
    ) -> VolumeResult<CarveStats> {
        let grid = &terrain.grid;
        let plans: Vec<ColumnPlan> = sweep_segment(grid, a, b, self.profile.half_width, self.step)
            .into_iter()
            .filter_map(|column| self.plan(terrain, column))
            .collect();
        apply_plans(grid, volume, &plans)
    }

    /// Carves a round lake centred on `center`; the bank is the height
    /// field at the centre.
    ///
    /// # Errors
    ///
    /// Propagates volume write failures.
    pub fn carve_lake<V: VoxelVolume + ?Sized>(
        &self,
        terrain: &Terrain,
        volume: &mut V,
        center: Point2,
    ) -> VolumeResult<CarveStats> {
        let grid = &terrain.grid;
        let r = self.profile.half_width;
        let (min, max) = grid.columns_in(&Rect::new(
            [center[0] - r, center[1] - r],
            [center[0] + r, center[1] + r],
        ));
        let mut plans = Vec::new();
        for cz in min[1]..max[1] {
            for cx in min[0]..max[0] {
                let offset = distance(grid.column_center(cx, cz), center);
                if offset > r {
                    continue;
                }
                let column = CoveredColumn { cell: [cx, cz], offset, foot: center };
                plans.extend(self.plan(terrain, column));
            }
        }
        apply_plans(grid, volume, &plans)
    }

    fn plan(&self, terrain: &Terrain, column: CoveredColumn) -> Option<ColumnPlan> {
        let grid = &terrain.grid;
        let bank = terrain.height.height(column.foot[0], column.foot[1]);
        let floor = bank - self.profile.depth_at(column.offset);
        let water = self.profile.water_surface(bank);
        let [x, z] = grid.column_center(column.cell[0], column.cell[1]);
        let ground = terrain.height.height(x, z);
        // Bed from one voxel under the lower of natural ground and floor, so
        // a floor above the slope rests on solid cells; open above the
        // higher of bank and local ground.
        let (lo, hi, _) = grid.cells_between(
            ground.min(floor) - grid.voxel_size,
            ground.max(bank).max(water) + grid.voxel_size,
        );
        (hi > lo).then_some(ColumnPlan {
            cell: column.cell,
            cells: (lo, hi),
            layers: Layers::Channel { floor, water },
        })
    }
}

/// Columns reached by walking `a -> b` in `step` increments and sweeping
/// `[-half_width, half_width]` across the path at every step.
///
/// Only columns whose centre lies within `half_width` of the segment are
/// kept. Steps are capped at half a voxel so no such column is skipped.
fn sweep_segment(grid: &VoxelGrid, a: Point2, b: Point2, half_width: f64, step: f64) -> Vec<CoveredColumn> {
    let step = step.min(grid.voxel_size * 0.5);
    let dir = direction(a, b);
    let normal = [-dir[1], dir[0]];
    let length = distance(a, b);
    let along = (length / step).ceil() as i64;
    let across = (2.0 * half_width / step).ceil() as i64;

    let mut covered: BTreeMap<[i32; 2], CoveredColumn> = BTreeMap::new();
    for i in 0..=along {
        let s = (i as f64 * step).min(length);
        let p = [a[0] + dir[0] * s, a[1] + dir[1] * s];
        for j in 0..=across {
            let w = (j as f64 * step).min(2.0 * half_width) - half_width;
            let q = [p[0] + normal[0] * w, p[1] + normal[1] * w];
            let cell = [grid.cell_of(q[0]), grid.cell_of(q[1])];
            if covered.contains_key(&cell) || !grid.has_column(cell[0], cell[1]) {
                continue;
            }
            let center = grid.column_center(cell[0], cell[1]);
            let projection = project_onto_segment(center, a, b);
            if projection.distance <= half_width {
                covered.insert(
                    cell,
                    CoveredColumn {
                        cell,
                        offset: projection.distance,
                        foot: projection.foot,
                    },
                );
            }
        }
    }
    covered.into_values().collect()
}

/// Applies column plans tile by tile.
fn apply_plans<V: VoxelVolume + ?Sized>(
    grid: &VoxelGrid,
    volume: &mut V,
    plans: &[ColumnPlan],
) -> VolumeResult<CarveStats> {
    let tile = CHUNK_SIZE as i32;
    let mut tiles: BTreeMap<[i32; 2], Vec<&ColumnPlan>> = BTreeMap::new();
    for plan in plans {
        let key = [plan.cell[0].div_euclid(tile), plan.cell[1].div_euclid(tile)];
        tiles.entry(key).or_default().push(plan);
    }

    let mut stats = CarveStats::default();
    for group in tiles.values() {
        let mut min = [i32::MAX; 3];
        let mut max = [i32::MIN; 3];
        for plan in group {
            min = [min[0].min(plan.cell[0]), min[1].min(plan.cells.0), min[2].min(plan.cell[1])];
            max = [
                max[0].max(plan.cell[0] + 1),
                max[1].max(plan.cells.1),
                max[2].max(plan.cell[1] + 1),
            ];
        }
        let region = VoxelRegion::new(min, max);
        let mut buffer: RegionBuffer = volume.read_region(region)?;
        for plan in group {
            for cy in plan.cells.0..plan.cells.1 {
                buffer.set([plan.cell[0], cy, plan.cell[1]], plan.layers.voxel(grid, cy));
            }
        }
        volume.write_region(&buffer)?;
        stats.columns += group.len();
        stats.writes += 1;
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MapConfig, WorldConfig};
    use crate::writer::{VoxelWriter, WriterStep};
    use verdance_core::{ChunkedVolume, RayFilter};

    fn built_terrain() -> (WorldConfig, Terrain, ChunkedVolume) {
        let mut config = WorldConfig::default();
        config.map = MapConfig { width: 256.0, depth: 256.0, ..MapConfig::default() };
        fill(config)
    }

    /// Ground rising steeply east of x = 0 through a restricted-zone ramp.
    fn sloped_terrain() -> (WorldConfig, Terrain, ChunkedVolume) {
        let mut config = WorldConfig::default();
        config.map = MapConfig { width: 256.0, depth: 256.0, ..MapConfig::default() };
        config.zones.restricted.min = [0.0, -200.0];
        config.zones.restricted.max = [200.0, 200.0];
        config.zones.restricted.boost = 60.0;
        fill(config)
    }

    fn fill(config: WorldConfig) -> (WorldConfig, Terrain, ChunkedVolume) {
        let terrain = Terrain::new(&config);
        let mut volume = ChunkedVolume::new(terrain.grid.bounds, terrain.grid.voxel_size);
        let mut writer = VoxelWriter::new(&terrain, config.map.chunk_cells);
        while let WriterStep::Written { .. } = writer.next_chunk(&terrain, &mut volume).unwrap() {}
        (config, terrain, volume)
    }

    /// Columns in `[min, max)` holding a non-water cell above an empty cell
    /// that itself sits above a filled one.
    fn overhangs(volume: &ChunkedVolume, min: [i32; 2], max: [i32; 2]) -> Vec<[i32; 3]> {
        let bounds = volume.bounds();
        let mut found = Vec::new();
        for cz in min[1]..max[1] {
            for cx in min[0]..max[0] {
                let (mut filled, mut gap) = (false, false);
                for cy in bounds.min[1]..bounds.max[1] {
                    let voxel = volume.voxel([cx, cy, cz]);
                    if voxel.is_empty() {
                        gap = filled;
                        continue;
                    }
                    if gap && !voxel.material().is_water() {
                        found.push([cx, cy, cz]);
                        break;
                    }
                    filled = true;
                    gap = false;
                }
            }
        }
        found
    }

    #[test]
    fn test_profile_formula() {
        let profile = ChannelProfile { half_width: 20.0, max_depth: 10.0, water_level: 7.0 };
        assert_eq!(profile.depth_at(0.0), 10.0);
        assert_eq!(profile.depth_at(10.0), 7.5);
        assert_eq!(profile.depth_at(-10.0), 7.5);
        assert_eq!(profile.depth_at(20.0), 0.0);
        assert_eq!(profile.depth_at(35.0), 0.0);
        assert_eq!(profile.water_surface(5.0), 2.0);
    }

    #[test]
    fn test_sweep_covers_every_column_in_strip() {
        let grid = VoxelGrid::from_map(&MapConfig::default());
        let (a, b) = ([-50.0, -30.0], [70.0, 45.0]);
        let columns = sweep_segment(&grid, a, b, 6.0, 2.0);
        for cz in -20..20 {
            for cx in -20..25 {
                let center = grid.column_center(cx, cz);
                let p = project_onto_segment(center, a, b);
                let inside = p.distance <= 6.0 && p.t > 0.0 && p.t < 1.0;
                if inside {
                    assert!(
                        columns.iter().any(|c| c.cell == [cx, cz]),
                        "column ({cx}, {cz}) missed"
                    );
                }
            }
        }
        assert!(columns.iter().all(|c| c.offset <= 6.0));
    }

    #[test]
    fn test_road_slab_follows_height_field() {
        let (config, terrain, mut volume) = built_terrain();
        let carver = RoadCarver::new(12.0, &config.roads);
        let stats = carver
            .carve_segment(&terrain, &mut volume, [-120.0, 10.0], [120.0, 10.0])
            .unwrap();
        assert!(stats.columns > 0);

        let grid = terrain.grid;
        for cx in [-20, 0, 13] {
            for cz in [1, 2, 3] {
                let [x, z] = grid.column_center(cx, cz);
                let g = terrain.height.height(x, z);
                let hit = volume.raycast_down(x, z, 150.0, 300.0, RayFilter::ALL).unwrap();
                assert_eq!(hit.voxel.material(), Material::Cobblestone);
                assert!((hit.position[1] - g).abs() < 0.02);
                let above = grid.cell_of(g) + 1;
                let top = grid.cell_of(g + config.roads.clearance);
                for cy in above..=top {
                    assert!(volume.voxel([cx, cy, cz]).is_empty(), "cell {cy} not cleared");
                }
            }
        }
    }

    #[test]
    fn test_road_carve_is_idempotent() {
        let (config, terrain, mut volume) = built_terrain();
        let carver = RoadCarver::new(8.0, &config.roads);
        carver.carve_segment(&terrain, &mut volume, [-100.0, -100.0], [90.0, 60.0]).unwrap();
        let once = volume.read_region(terrain.grid.bounds).unwrap();
        carver.carve_segment(&terrain, &mut volume, [-100.0, -100.0], [90.0, 60.0]).unwrap();
        assert_eq!(volume.read_region(terrain.grid.bounds).unwrap(), once);
    }

    #[test]
    fn test_river_bed_follows_parabola() {
        let (_, terrain, mut volume) = built_terrain();
        let profile = ChannelProfile { half_width: 20.0, max_depth: 10.0, water_level: 7.0 };
        let carver = ChannelCarver::new(profile, 2.0);
        // Centreline on column centres: x = -62 is the centre of column -16.
        let (a, b) = ([-62.0, -120.0], [-62.0, 120.0]);
        carver.carve_segment(&terrain, &mut volume, a, b).unwrap();

        let grid = terrain.grid;
        for cx in -20..=-12 {
            let cz = 3;
            let [x, z] = grid.column_center(cx, cz);
            let w = (x - -62.0f64).abs();
            let bank = terrain.height.height(-62.0, z);
            let expected = bank - profile.depth_at(w);
            let hit = volume
                .raycast_down(x, z, 150.0, 300.0, RayFilter::IGNORE_WATER)
                .unwrap();
            assert_eq!(hit.voxel.material(), Material::Mud);
            assert!(
                (hit.position[1] - expected).abs() < 0.02,
                "offset {w}: bed {} expected {expected}",
                hit.position[1]
            );
        }

        // Centreline: full depth, water on top.
        let [x, z] = grid.column_center(-16, 3);
        let bank = terrain.height.height(x, z);
        let wet = volume.raycast_down(x, z, 150.0, 300.0, RayFilter::ALL).unwrap();
        assert_eq!(wet.voxel.material(), Material::Water);
        assert!((wet.position[1] - profile.water_surface(bank)).abs() < 0.02);
    }

    #[test]
    fn test_lake_is_round_and_wet() {
        let (_, terrain, mut volume) = built_terrain();
        let profile = ChannelProfile { half_width: 30.0, max_depth: 12.0, water_level: 9.0 };
        let center = [50.0, 50.0];
        let stats = ChannelCarver::new(profile, 2.0)
            .carve_lake(&terrain, &mut volume, center)
            .unwrap();
        assert!(stats.columns > 120);

        let hit = volume.raycast_down(50.0, 50.0, 150.0, 300.0, RayFilter::ALL).unwrap();
        assert_eq!(hit.voxel.material(), Material::Water);

        let outside = volume.raycast_down(50.0, 90.0, 150.0, 300.0, RayFilter::ALL).unwrap();
        assert_ne!(outside.voxel.material(), Material::Water);
        assert_ne!(outside.voxel.material(), Material::Mud);
    }

    #[test]
    fn test_river_bed_rests_on_ground_across_slope() {
        let (_, terrain, mut volume) = sloped_terrain();
        let profile = ChannelProfile { half_width: 12.0, max_depth: 8.0, water_level: 5.0 };
        ChannelCarver::new(profile, 2.0)
            .carve_segment(&terrain, &mut volume, [22.0, -100.0], [22.0, 100.0])
            .unwrap();

        // The west bank sits well below the floor the bank height implies.
        let bank = terrain.height.height(22.0, 6.0);
        assert!(bank - terrain.height.height(10.0, 6.0) > 2.0);

        let floating = overhangs(&volume, [-4, -28], [16, 28]);
        assert!(floating.is_empty(), "bed over air at {:?}", &floating[..floating.len().min(4)]);

        let hit = volume.raycast_down(10.0, 6.0, 150.0, 300.0, RayFilter::IGNORE_WATER).unwrap();
        assert_eq!(hit.voxel.material(), Material::Mud);
        assert!((hit.position[1] - bank).abs() < 0.02);
    }

    #[test]
    fn test_lake_basin_rests_on_ground_across_slope() {
        let (_, terrain, mut volume) = sloped_terrain();
        let profile = ChannelProfile { half_width: 28.0, max_depth: 9.0, water_level: 6.0 };
        ChannelCarver::new(profile, 2.0)
            .carve_lake(&terrain, &mut volume, [14.0, 40.0])
            .unwrap();

        let floating = overhangs(&volume, [-6, 2], [12, 18]);
        assert!(floating.is_empty(), "bed over air at {:?}", &floating[..floating.len().min(4)]);
    }
}
