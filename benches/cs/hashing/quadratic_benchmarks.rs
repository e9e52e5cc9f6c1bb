use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quadmap::hashing::{FnvBuildHasher, FnvQuadraticHashMap, QuadraticHashMap};
use rand::{rngs::StdRng, Rng, SeedableRng};

const SIZES: [usize; 3] = [100, 1_000, 10_000];

fn random_keys(n: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n).map(|_| rng.gen()).collect()
}

fn filled_map(keys: &[u64]) -> FnvQuadraticHashMap<u64, u64> {
    let mut map = QuadraticHashMap::with_hasher(10, FnvBuildHasher);
    for &k in keys {
        // a full probe sequence is possible but rare; skip such keys
        let _ = map.insert(k, k);
    }
    map
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadratic_insert");
    for &size in SIZES.iter() {
        let keys = random_keys(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &keys, |b, keys| {
            b.iter(|| black_box(filled_map(keys)))
        });
    }
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadratic_get");
    for &size in SIZES.iter() {
        let keys = random_keys(size);
        let map = filled_map(&keys);
        group.bench_with_input(BenchmarkId::from_parameter(size), &keys, |b, keys| {
            b.iter(|| {
                for k in keys {
                    black_box(map.get(k));
                }
            })
        });
    }
    group.finish();
}

fn bench_remove_insert_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadratic_churn");
    for &size in SIZES.iter() {
        let keys = random_keys(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &keys, |b, keys| {
            b.iter(|| {
                let mut map = filled_map(keys);
                for &k in keys {
                    map.remove(&k);
                    let _ = map.insert(k, k + 1);
                }
                black_box(map.len())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_get, bench_remove_insert_churn);
criterion_main!(benches);
