use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use stream::Stream;

// ============================================================================
// Pipeline Construction Benchmarks
// ============================================================================

fn benchmark_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");

    // Building a pipeline performs no element access, so this should stay
    // flat regardless of the source size.
    for size in [100i64, 10_000, 1_000_000] {
        group.bench_with_input(BenchmarkId::new("five_stages", size), &size, |b, &size| {
            b.iter(|| {
                Stream::range(1, black_box(size))
                    .map(|value| value * 2)
                    .filter(|value| value % 3 != 0)
                    .skip(10)
                    .take(50)
            });
        });
    }

    group.finish();
}

// ============================================================================
// Traversal Benchmarks
// ============================================================================

fn benchmark_collect(c: &mut Criterion) {
    let mut group = c.benchmark_group("collect");

    for size in [100i64, 1_000, 10_000] {
        group.bench_with_input(
            BenchmarkId::new("map_filter_chain", size),
            &size,
            |b, &size| {
                b.iter(|| {
                    Stream::range(1, black_box(size))
                        .map(|value| value * 2)
                        .filter(|value| value % 3 != 0)
                        .collect()
                });
            },
        );
    }

    for size in [100i64, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("take_prefix", size), &size, |b, &size| {
            // take() cuts the upstream walk, so the source size should not
            // matter here.
            b.iter(|| {
                Stream::range(1, black_box(size))
                    .map(|value| value + 1)
                    .take(50)
                    .collect()
            });
        });
    }

    group.finish();
}

fn benchmark_aggregates(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregates");

    let size = 10_000i64;
    group.bench_with_input(BenchmarkId::new("sum", size), &size, |b, &size| {
        b.iter(|| Stream::range(1, black_box(size)).sum());
    });
    group.bench_with_input(BenchmarkId::new("min", size), &size, |b, &size| {
        b.iter(|| Stream::range(1, black_box(size)).min().unwrap());
    });
    group.bench_with_input(BenchmarkId::new("count", size), &size, |b, &size| {
        b.iter(|| Stream::range(1, black_box(size)).count());
    });

    group.finish();
}

// ============================================================================
// Re-walking Transform Benchmarks
// ============================================================================

fn benchmark_re_walking_transforms(c: &mut Criterion) {
    let mut group = c.benchmark_group("re_walking");

    // uniq and with_index re-walk their upstream per element; these grow
    // quadratically with the source size.
    for size in [10i64, 100, 500] {
        group.bench_with_input(BenchmarkId::new("uniq", size), &size, |b, &size| {
            b.iter(|| {
                Stream::range(1, black_box(size))
                    .map(|value| value % 17)
                    .uniq()
                    .collect()
            });
        });
    }

    for size in [10i64, 100, 500] {
        group.bench_with_input(BenchmarkId::new("with_index", size), &size, |b, &size| {
            b.iter(|| Stream::range(1, black_box(size)).with_index().collect());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_construction,
    benchmark_collect,
    benchmark_aggregates,
    benchmark_re_walking_transforms
);
criterion_main!(benches);
