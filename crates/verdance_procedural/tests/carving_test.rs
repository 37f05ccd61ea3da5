//! # Carving Integration Tests
//!
//! Reads the finished volume back with downward rays and checks that roads,
//! the river and lakes have the surfaces their profiles promise.

use verdance_core::{Material, RayFilter, RayHit, VoxelVolume};
use verdance_procedural::{build, LakeConfig, MapConfig, RiverPath, WorldConfig, WorldHandle};

/// Voxel occupancy is quantised to a byte; surfaces come back within this.
const SURFACE_TOLERANCE: f64 = 0.02;

fn medium_config() -> WorldConfig {
    let mut config = WorldConfig::default();
    config.map = MapConfig { width: 480.0, depth: 480.0, ..MapConfig::default() };
    config.zones.restricted.min = [60.0, -220.0];
    config.zones.restricted.max = [220.0, -60.0];
    config.river = Some(RiverPath {
        name: "Millrace".to_owned(),
        waypoints: vec![[-100.0, -240.0], [-100.0, 100.0], [240.0, 100.0]],
        width: 24.0,
        max_depth: 8.0,
        water_level: 5.0,
    });
    config.lakes = vec![LakeConfig {
        center: [-178.0, -178.0],
        radius: 30.0,
        max_depth: 9.0,
        water_level: 6.0,
    }];
    config
}

fn cast(world: &WorldHandle, x: f64, z: f64, filter: RayFilter) -> RayHit {
    let volume = world.volume();
    let bounds = volume.bounds();
    let size = volume.voxel_size();
    let top = f64::from(bounds.max[1]) * size;
    let reach = f64::from(bounds.max[1] - bounds.min[1]) * size;
    volume
        .raycast_down(x, z, top, reach, filter)
        .unwrap_or_else(|| panic!("no ground at ({x}, {z})"))
}

/// Test: Every road column is paved, with its top at the height-field
/// elevation of the column centre.
#[test]
fn test_road_surface_follows_height_field() {
    let world = build(medium_config()).unwrap();
    let mut checked = 0;

    for k in -58..58 {
        let x = f64::from(k) * 4.0 + 2.0;
        // Leave the river crossing out.
        if (x + 100.0).abs() < 24.0 {
            continue;
        }
        for z in [-2.0, 2.0] {
            let hit = cast(&world, x, z, RayFilter::ALL);
            assert_eq!(hit.voxel.material(), Material::Cobblestone, "unpaved at ({x}, {z})");
            let expected = world.height(x, z);
            assert!(
                (hit.position[1] - expected).abs() < SURFACE_TOLERANCE,
                "road at ({x}, {z}) is {} not {expected}",
                hit.position[1]
            );
            checked += 1;
        }
    }
    println!("Checked {checked} road columns");
}

/// Test: The river bed follows the parabolic profile below the bank at the
/// centreline, with water above it.
#[test]
fn test_river_channel_profile() {
    let config = medium_config();
    let river = config.river.clone().unwrap();
    let world = build(config).unwrap();

    let z = -150.0;
    let bank = world.height(-100.0, z);
    let half = river.width * 0.5;

    for x in [-98.0_f64, -106.0, -110.0] {
        let offset = (x + 100.0).abs();
        let floor = bank - river.max_depth * (1.0 - (offset / half).powi(2));
        let bed = cast(&world, x, z, RayFilter::IGNORE_WATER);
        assert_eq!(bed.voxel.material(), Material::Mud);
        assert!(
            (bed.position[1] - floor).abs() < SURFACE_TOLERANCE,
            "bed at offset {offset} is {} not {floor}",
            bed.position[1]
        );
    }

    let water = cast(&world, -98.0, z, RayFilter::ALL);
    assert_eq!(water.voxel.material(), Material::Water);
    let level = bank - river.max_depth + river.water_level;
    assert!((water.position[1] - level).abs() < SURFACE_TOLERANCE);

    // Beyond the channel the ground is untouched.
    let outside = cast(&world, -82.0, z, RayFilter::ALL);
    assert_ne!(outside.voxel.material(), Material::Mud);
    assert!((outside.position[1] - world.height(-82.0, z)).abs() < SURFACE_TOLERANCE);
}

/// Test: The river is carved after the roads and cuts through them.
#[test]
fn test_river_cuts_road() {
    let world = build(medium_config()).unwrap();
    let hit = cast(&world, -98.0, 2.0, RayFilter::ALL);
    assert_eq!(hit.voxel.material(), Material::Water);
    let bed = cast(&world, -98.0, 2.0, RayFilter::IGNORE_WATER);
    assert_eq!(bed.voxel.material(), Material::Mud);
    assert!(bed.position[1] < world.height(-98.0, 2.0));
}

/// Test: A lake is deepest at its centre and filled with water.
#[test]
fn test_lake_basin() {
    let config = medium_config();
    let lake = config.lakes[0].clone();
    let world = build(config).unwrap();

    let [x, z] = lake.center;
    let bank = world.height(x, z);
    let bed = cast(&world, x, z, RayFilter::IGNORE_WATER);
    assert_eq!(bed.voxel.material(), Material::Mud);
    assert!((bed.position[1] - (bank - lake.max_depth)).abs() < SURFACE_TOLERANCE);

    let water = cast(&world, x, z, RayFilter::ALL);
    assert_eq!(water.voxel.material(), Material::Water);
    let level = bank - lake.max_depth + lake.water_level;
    assert!((water.position[1] - level).abs() < SURFACE_TOLERANCE);

    let shore = cast(&world, x + lake.radius + 8.0, z, RayFilter::ALL);
    assert_ne!(shore.voxel.material(), Material::Water);
}

/// The medium map with a steep restricted-zone ramp east of x = 0 and
/// south of z = -40, a river along its lower edge and a lake on its flank.
fn sloped_config() -> WorldConfig {
    let mut config = medium_config();
    config.zones.restricted.min = [0.0, -230.0];
    config.zones.restricted.max = [230.0, -40.0];
    config.zones.restricted.boost = 60.0;
    if let Some(river) = config.river.as_mut() {
        river.waypoints = vec![[22.0, -240.0], [22.0, -20.0]];
    }
    config.lakes[0].center = [150.0, -70.0];
    config
}

/// Cells holding something other than water above an empty cell that
/// itself sits above a filled one, in columns `[min, max)`.
fn floating_cells(world: &WorldHandle, min: [i32; 2], max: [i32; 2]) -> Vec<[i32; 3]> {
    let volume = world.volume();
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
                if gap && voxel.material() != Material::Water {
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

/// Test: Across a slope the river and lake beds rest on solid ground and
/// the water never rises above the bank.
#[test]
fn test_channels_across_slope() {
    let config = sloped_config();
    let river = config.river.clone().unwrap();
    let lake = config.lakes[0].clone();
    let world = build(config).unwrap();

    let floating = floating_cells(&world, [-4, -60], [60, -4]);
    assert!(
        floating.is_empty(),
        "{} cells over air, first {:?}",
        floating.len(),
        floating.first()
    );

    // West of the river the ground drops below the bank-derived floor.
    let z = -150.0;
    let bank = world.height(22.0, z);
    assert!(bank - world.height(10.0, z) > 2.0);
    let rim = cast(&world, 10.0, z, RayFilter::IGNORE_WATER);
    assert_eq!(rim.voxel.material(), Material::Mud);
    assert!((rim.position[1] - bank).abs() < SURFACE_TOLERANCE);

    let mut checked = 0;
    for k in 0..40 {
        let z = -238.0 + f64::from(k) * 4.0;
        let bank = world.height(22.0, z);
        let water = cast(&world, 22.0, z, RayFilter::ALL);
        assert_eq!(water.voxel.material(), Material::Water, "dry at z = {z}");
        assert!(water.position[1] <= bank + SURFACE_TOLERANCE);
        let level = bank - river.max_depth + river.water_level;
        assert!((water.position[1] - level).abs() < SURFACE_TOLERANCE);
        checked += 1;
    }

    let [x, z] = lake.center;
    let bank = world.height(x, z);
    let water = cast(&world, x, z, RayFilter::ALL);
    assert_eq!(water.voxel.material(), Material::Water);
    assert!(water.position[1] <= bank + SURFACE_TOLERANCE);
    println!("Checked {checked} river columns across the slope");
}
