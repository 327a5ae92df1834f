use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use tetratree::TetraMap;

criterion_group!(benches, bench_put, bench_get, bench_walk);
criterion_main!(benches);

fn bench_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("Put");
    for n in [1000u64, 10000].iter() {
        group.bench_function(BenchmarkId::new("Tetra", n), |b| {
            b.iter(|| {
                let mut m = TetraMap::new();
                for i in 0..*n {
                    m.put(i, i);
                }
                assert!(m.len() == *n as usize);
            })
        });
        group.bench_function(BenchmarkId::new("Std", n), |b| {
            b.iter(|| {
                let mut m = std::collections::BTreeMap::new();
                for i in 0..*n {
                    m.insert(i, i);
                }
                assert!(m.len() == *n as usize);
            })
        });
    }
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let mut group = c.benchmark_group("Get");
    for n in [1000u64, 10000].iter() {
        let keys: Vec<u64> = (0..*n).map(|_| rng.gen()).collect();

        let mut tetra_map = TetraMap::new();
        for &k in &keys {
            tetra_map.put(k, k);
        }
        let mut std_map = std::collections::BTreeMap::new();
        for &k in &keys {
            std_map.insert(k, k);
        }

        group.bench_function(BenchmarkId::new("Tetra", n), |b| {
            b.iter(|| {
                for k in &keys {
                    assert!(tetra_map.get(k).is_some());
                }
            })
        });
        group.bench_function(BenchmarkId::new("Std", n), |b| {
            b.iter(|| {
                for k in &keys {
                    assert!(std_map.get(k).is_some());
                }
            })
        });
    }
    group.finish();
}

fn bench_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("Walk");
    for n in [1000u64, 10000].iter() {
        let mut tetra_map = TetraMap::new();
        for i in 0..*n {
            tetra_map.put(i, i);
        }
        let mut std_map = std::collections::BTreeMap::new();
        for i in 0..*n {
            std_map.insert(i, i);
        }

        group.bench_function(BenchmarkId::new("TetraCursor", n), |b| {
            b.iter(|| {
                let mut c = tetra_map.least().unwrap();
                let mut last = *c.key();
                while c.ascend() {
                    last = *c.key();
                }
                assert!(last == n - 1);
            })
        });
        group.bench_function(BenchmarkId::new("TetraIter", n), |b| {
            b.iter(|| for _kv in tetra_map.iter() {})
        });
        group.bench_function(BenchmarkId::new("Std", n), |b| {
            b.iter(|| for _kv in std_map.iter() {})
        });
    }
    group.finish();
}
