//! Benchmarks for the squared-L2 kernels.
//!
//! Distance computation dominates both insertion and search, so the
//! scalar-vs-SIMD gap here translates almost directly into index throughput.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallworld::distance::{l2_squared, l2_squared_scalar};

fn random_pair(dim: usize) -> (Vec<f32>, Vec<f32>) {
    let mut rng = StdRng::seed_from_u64(42);
    let a = (0..dim).map(|_| rng.random::<f32>() * 2.0 - 1.0).collect();
    let b = (0..dim).map(|_| rng.random::<f32>() * 2.0 - 1.0).collect();
    (a, b)
}

fn bench_l2_squared(c: &mut Criterion) {
    let mut group = c.benchmark_group("l2_squared");

    for dim in [32, 64, 128, 256, 768, 1536] {
        let (a, b) = random_pair(dim);
        group.throughput(Throughput::Elements(dim as u64));

        group.bench_with_input(BenchmarkId::new("simd", dim), &dim, |bench, _| {
            bench.iter(|| l2_squared(black_box(&a), black_box(&b)))
        });
        group.bench_with_input(BenchmarkId::new("scalar", dim), &dim, |bench, _| {
            bench.iter(|| l2_squared_scalar(black_box(&a), black_box(&b)))
        });
    }

    group.finish();
}

fn bench_tail_lengths(c: &mut Criterion) {
    // Lengths just off the lane width exercise the scalar tail.
    let mut group = c.benchmark_group("l2_squared_tail");
    for dim in [31, 33, 127, 129] {
        let (a, b) = random_pair(dim);
        group.bench_with_input(BenchmarkId::from_parameter(dim), &dim, |bench, _| {
            bench.iter(|| l2_squared(black_box(&a), black_box(&b)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_l2_squared, bench_tail_lengths);
criterion_main!(benches);
