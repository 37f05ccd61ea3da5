//! Benchmark for height-field sampling.
//!
//! TARGET: a full 500 x 500 column pass well under 100ms
//!
//! Run with: cargo bench --package verdance_procedural --bench height_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use verdance_procedural::{HeightField, SimplexNoise, WorldConfig, WorldSeed, ZoneClassifier};

fn benchmark_noise_sample(c: &mut Criterion) {
    let noise = SimplexNoise::new(WorldSeed::new(42));

    c.bench_function("simplex_sample", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 0.1;
            black_box(noise.sample(black_box(x), black_box(x * 0.7)))
        });
    });
}

fn benchmark_single_height(c: &mut Criterion) {
    let field = HeightField::new(&WorldConfig::default());

    c.bench_function("height_single_sample", |b| {
        let mut x = -1000.0f64;
        b.iter(|| {
            x = if x > 1000.0 { -1000.0 } else { x + 0.37 };
            black_box(field.height(black_box(x), black_box(x * 0.5)))
        });
    });
}

fn benchmark_reference_grid(c: &mut Criterion) {
    let config = WorldConfig::default();
    let field = HeightField::new(&config);
    let step = config.map.voxel_size;
    let columns = (config.map.width / step) as u64;

    let mut group = c.benchmark_group("reference_grid");
    group.throughput(Throughput::Elements(columns * columns));
    group.sample_size(10);

    group.bench_function("height_500x500_columns", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            for j in 0..columns {
                for i in 0..columns {
                    let x = -1000.0 + (i as f64 + 0.5) * step;
                    let z = -1000.0 + (j as f64 + 0.5) * step;
                    sum += field.height(x, z);
                }
            }
            black_box(sum)
        });
    });

    group.finish();
}

fn benchmark_zone_lookup(c: &mut Criterion) {
    let zones = ZoneClassifier::new(&WorldConfig::default());

    c.bench_function("zone_classify", |b| {
        let mut x = -1000.0f64;
        b.iter(|| {
            x = if x > 1000.0 { -1000.0 } else { x + 3.1 };
            black_box(zones.classify(black_box(x), black_box(-x * 0.8)))
        });
    });
}

criterion_group!(
    benches,
    benchmark_noise_sample,
    benchmark_single_height,
    benchmark_reference_grid,
    benchmark_zone_lookup,
);
criterion_main!(benches);
