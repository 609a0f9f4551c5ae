use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lfucache::LfuCache;

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("insertion within capacity");
    for size in (1000..=10000).step_by(1000) {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut cache = LfuCache::new(size as usize).unwrap();
            b.iter(|| {
                for i in 0..size {
                    cache.insert(i, i);
                }
            });
        });
    }
    group.finish();

    let mut group = c.benchmark_group("insertion evicting");
    for size in (1000..=10000).step_by(1000) {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut cache = LfuCache::new((size / 4) as usize).unwrap();
            b.iter(|| {
                for i in 0..size {
                    cache.insert(i, i);
                }
            });
        });
    }
    group.finish();

    let mut group = c.benchmark_group("access hit");
    for size in (1000..=10000).step_by(1000) {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut cache = LfuCache::new(size as usize).unwrap();
            for i in 0..size {
                cache.insert(i, i);
            }
            b.iter(|| {
                for i in 0..size {
                    cache.get(&i);
                }
            });
        });
    }
    group.finish();

    let mut group = c.benchmark_group("access single key");
    group.bench_function("hot key", |b| {
        let mut cache = LfuCache::new(1000).unwrap();
        for i in 0..1000_u64 {
            cache.insert(i, i);
        }
        b.iter(|| cache.get(&0).copied());
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
