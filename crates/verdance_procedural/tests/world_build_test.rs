//! # World Build Integration Tests
//!
//! Whole-pipeline runs: determinism, rebuilds into a reused volume, the
//! reference map's bridges and the background runner.

use std::time::Instant;

use verdance_core::{ChunkedVolume, PartShape, VoxelVolume};
use verdance_procedural::{
    build, build_with_volume, find_crossings, spawn_build, BuildEvent, LakeConfig, MapConfig,
    PropKind, RiverPath, VoxelGrid, WorldConfig, WorldHandle,
};

/// 480 x 480 map with its own river and lake so every pass has work.
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

/// Every allocated chunk's bytes, sorted by coordinate.
fn chunk_snapshot(world: &WorldHandle) -> Vec<([i32; 3], Vec<u8>)> {
    let volume = world.volume();
    let mut chunks: Vec<_> = volume
        .chunk_coords()
        .into_iter()
        .filter_map(|c| volume.chunk_bytes(c).map(|bytes| ([c.x, c.y, c.z], bytes.to_vec())))
        .collect();
    chunks.sort_by_key(|(coord, _)| *coord);
    chunks
}

/// Test: Same configuration, same voxels and same props.
#[test]
fn test_build_is_deterministic() {
    let first = build(medium_config()).unwrap();
    let second = build(medium_config()).unwrap();

    assert_eq!(first.stats(), second.stats());
    assert_eq!(chunk_snapshot(&first), chunk_snapshot(&second));
    assert_eq!(first.props().len(), second.props().len());
    for (a, b) in first.props().iter().zip(second.props()) {
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.transform, b.transform);
        assert_eq!(a.model, b.model);
    }
    println!("Deterministic build: {:?}", first.stats());
}

/// Test: The props seed moves props without touching the terrain.
#[test]
fn test_props_seed_only_changes_props() {
    let base = build(medium_config()).unwrap();
    let mut reseeded = medium_config();
    reseeded.props_seed = Some(reseeded.seed ^ 0xFFFF);
    let reseeded = build(reseeded).unwrap();

    assert_eq!(chunk_snapshot(&base), chunk_snapshot(&reseeded));
    let rocks = |w: &WorldHandle| {
        w.props_of(PropKind::Rock)
            .map(|p| p.position_xz())
            .collect::<Vec<_>>()
    };
    assert_ne!(rocks(&base), rocks(&reseeded));
}

/// Test: Destroying a world and rebuilding into the same volume gives the
/// same world.
#[test]
fn test_destroy_then_rebuild_is_identical() {
    let config = medium_config();
    let grid = VoxelGrid::from_map(&config.map);
    let volume = ChunkedVolume::new(grid.bounds, grid.voxel_size);

    let world = build_with_volume(config.clone(), volume).unwrap();
    let stats = world.stats().clone();
    let snapshot = chunk_snapshot(&world);
    let scene = world.scene_container();
    let props = world.props_container();
    assert_eq!(props.read().len(), world.props().len());

    let volume = world.destroy();
    assert!(volume.is_empty());
    assert!(scene.read().is_empty());
    assert!(props.read().is_empty());

    let rebuilt = build_with_volume(config.clone(), volume).unwrap();
    assert_eq!(rebuilt.stats(), &stats);
    assert_eq!(chunk_snapshot(&rebuilt), snapshot);

    let river = config.river.as_ref().unwrap();
    let expected = find_crossings(&config.all_roads(), river, &config.bridge)
        .into_iter()
        .filter(|c| config.map.contains(c.position[0], c.position[1]))
        .count();
    assert_eq!(rebuilt.stats().bridges, expected);
    assert_eq!(rebuilt.crossings().len(), expected);
}

/// Test: The reference 2000 x 2000 map gets exactly two bridges, one per
/// main road, each long enough and laid along its road.
#[test]
fn test_reference_map_builds_two_bridges() {
    let config = WorldConfig::default();
    let river = config.river.clone().unwrap();

    let start = Instant::now();
    let world = build(config.clone()).unwrap();
    println!("Reference map built in {:?}: {:?}", start.elapsed(), world.stats());

    assert_eq!(world.stats().bridges, 2);
    assert_eq!(world.crossings().len(), 2);
    assert_eq!(world.boundary().len(), 4);
    assert!(world.stats().signposts >= 1);
    assert!(world.stats().torches > 0);

    let bridges: Vec<_> = world.props_of(PropKind::Bridge).collect();
    assert_eq!(bridges.len(), 2);
    for (bridge, crossing) in bridges.iter().zip(world.crossings()) {
        let Some(PartShape::Block { size }) = bridge.model.part("deck").map(|p| p.shape) else {
            panic!("bridge without deck");
        };
        assert!(f64::from(size.x) >= river.width + config.bridge.margin - 1e-3);

        let along = bridge.transform.rotation.rotate(verdance_shared::Vec3::X);
        let dot = f64::from(along.x) * crossing.direction[0] + f64::from(along.z) * crossing.direction[1];
        assert!((dot - 1.0).abs() < 1e-4, "{} bridge not along the road", crossing.road);

        let [x, z] = crossing.position;
        let bank = world.height(x, z);
        let water = bank - river.max_depth + river.water_level;
        assert!(f64::from(bridge.transform.position.y) > water);
    }
    let roads: Vec<&str> = world.crossings().iter().map(|c| c.road.as_str()).collect();
    assert!(roads.contains(&"King's Road"));
    assert!(roads.contains(&"Pilgrim Way"));
}

/// Test: A background build reports progress and yields the same world as
/// a build on the calling thread.
#[test]
fn test_background_build_matches_foreground() {
    let background = spawn_build(medium_config());
    let events: Vec<BuildEvent> = background.events().iter().collect();
    let world = background.join().unwrap();
    let foreground = build(medium_config()).unwrap();

    assert_eq!(world.stats(), foreground.stats());
    assert_eq!(chunk_snapshot(&world), chunk_snapshot(&foreground));

    let yields = events
        .iter()
        .filter(|e| matches!(e, BuildEvent::Yielded { .. }))
        .count();
    assert_eq!(yields as u32, world.stats().yields);
    assert_eq!(events.last(), Some(&BuildEvent::Finished(world.stats().clone())));
    println!("Background build: {} events", events.len());
}
