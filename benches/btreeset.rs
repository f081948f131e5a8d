//! Benchmarks for the Standard Library's [`BTreeSet`], for comparison.

use std::collections::BTreeSet;

use criterion::{AxisScale, BenchmarkId, Criterion, PlotConfiguration, black_box};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Benchmarking sizes
const SIZES: [usize; 6] = [1, 10, 100, 1000, 10_000, 100_000];

/// Benchmarking insertion
pub fn insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("BTreeSet Insert");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let mut set: BTreeSet<u64> =
                std::iter::repeat_with(|| rng.random()).take(size).collect();

            b.iter(|| {
                set.insert(rng.random());
            });
        });
    }
}

/// Benchmarking search
pub fn search(c: &mut Criterion) {
    let mut group = c.benchmark_group("BTreeSet Search");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let set: BTreeSet<u64> = std::iter::repeat_with(|| rng.random()).take(size).collect();
            let keys: Vec<u64> = set.iter().copied().step_by((size / 10).max(1)).collect();

            b.iter(|| {
                for key in &keys {
                    black_box(set.contains(key));
                }
            });
        });
    }
}

/// Benchmarking iteration
pub fn iter(c: &mut Criterion) {
    c.bench_function("BTreeSet Iter", |b| {
        let mut rng = StdRng::seed_from_u64(0x1234_abcd);
        let set: BTreeSet<u64> = std::iter::repeat_with(|| rng.random())
            .take(100_000)
            .collect();

        b.iter(|| {
            for el in &set {
                black_box(el);
            }
        });
    });
}

/// Run all benchmarks.
pub fn benchmark(c: &mut Criterion) {
    insert(c);
    search(c);
    iter(c);
}
