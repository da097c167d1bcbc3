//! Generator throughput benchmarks.
//!
//! Run with: `cargo bench --package tickforge-bench`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tickforge_bench::{CASCADE, instrument, standard_specs, synthetic_ticks};
use tickforge_lib::{GeneratorConfig, TimeframeCascade};

const SIZES: &[usize] = &[10_000, 100_000];

fn generator_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("generators");
    let instrument = instrument();

    for &size in SIZES {
        let ticks = synthetic_ticks(size, 42);
        group.throughput(Throughput::Elements(size as u64));

        for spec in standard_specs() {
            let config = GeneratorConfig::new(spec);
            group.bench_with_input(BenchmarkId::new(spec.name(), size), &ticks, |b, ticks| {
                b.iter(|| {
                    let Ok(mut generator) = config.build(Some(&instrument)) else {
                        return 0;
                    };
                    black_box(generator.generate(black_box(ticks)).len())
                });
            });
        }
    }
    group.finish();
}

fn cascade_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("cascade");
    let instrument = instrument();

    for &size in SIZES {
        let ticks = synthetic_ticks(size, 42);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("m1-m5-h1-d1", size), &ticks, |b, ticks| {
            b.iter(|| {
                let Ok(mut cascade) = TimeframeCascade::new(CASCADE) else {
                    return 0;
                };
                cascade.setup(Some(&instrument));
                black_box(cascade.generate(black_box(ticks)).map_or(0, |out| out.len()))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, generator_benchmark, cascade_benchmark);
criterion_main!(benches);
