//! Benchmark for terrain chunk fill and path carving.
//!
//! TARGET: the 2000 x 2000 reference terrain written in under 3 seconds
//!
//! Run with: cargo bench --package verdance_procedural --bench chunk_fill_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use verdance_core::ChunkedVolume;
use verdance_procedural::{
    ChannelCarver, ChannelProfile, MapConfig, RoadCarver, Terrain, VoxelWriter, WorldConfig,
    WriterStep,
};

fn config(size: f64) -> WorldConfig {
    let mut config = WorldConfig::default();
    config.map = MapConfig { width: size, depth: size, ..MapConfig::default() };
    config
}

fn fill(terrain: &Terrain, chunk_cells: u32) -> ChunkedVolume {
    let mut volume = ChunkedVolume::new(terrain.grid.bounds, terrain.grid.voxel_size);
    let mut writer = VoxelWriter::new(terrain, chunk_cells);
    while let Ok(WriterStep::Written { .. }) = writer.next_chunk(terrain, &mut volume) {}
    volume
}

fn benchmark_single_chunk(c: &mut Criterion) {
    let config = config(64.0);
    let terrain = Terrain::new(&config);

    c.bench_function("single_chunk_fill", |b| {
        b.iter(|| black_box(fill(&terrain, config.map.chunk_cells)));
    });
}

fn benchmark_map_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_fill");
    group.sample_size(10);

    for size in [512.0, 2000.0] {
        let config = config(size);
        let terrain = Terrain::new(&config);
        let columns = (size / config.map.voxel_size) as u64;
        group.throughput(Throughput::Elements(columns * columns));
        group.bench_function(format!("fill_{size}x{size}"), |b| {
            b.iter(|| black_box(fill(&terrain, config.map.chunk_cells)));
        });
    }

    group.finish();
}

fn benchmark_carving(c: &mut Criterion) {
    let config = config(512.0);
    let terrain = Terrain::new(&config);
    let base = fill(&terrain, config.map.chunk_cells);
    let road = RoadCarver::new(12.0, &config.roads);
    let river = ChannelCarver::new(
        ChannelProfile { half_width: 20.0, max_depth: 10.0, water_level: 7.0 },
        config.roads.step,
    );

    let mut group = c.benchmark_group("carving");
    group.sample_size(10);

    group.bench_function("road_segment_400", |b| {
        b.iter_batched(
            || base.clone(),
            |mut volume| {
                road.carve_segment(&terrain, &mut volume, [-200.0, 0.0], [200.0, 0.0])
                    .map(|stats| black_box(stats.columns))
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.bench_function("river_segment_400", |b| {
        b.iter_batched(
            || base.clone(),
            |mut volume| {
                river
                    .carve_segment(&terrain, &mut volume, [0.0, -200.0], [0.0, 200.0])
                    .map(|stats| black_box(stats.columns))
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, benchmark_single_chunk, benchmark_map_fill, benchmark_carving);
criterion_main!(benches);
