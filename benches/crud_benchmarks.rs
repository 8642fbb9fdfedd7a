use bplus_index::BPlusTree;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::BTreeMap;

const N: usize = 10_000;

const BLOCK_SIZES: [usize; 4] = [3, 15, 63, 255];

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

fn filled_tree(keys: &[i64]) -> BPlusTree<i64, i64> {
    let mut tree = BPlusTree::default();
    for &k in keys {
        tree.insert(k, k);
    }
    tree
}

// ─── Insert ─────────────────────────────────────────────────────────────────

fn bench_insert_ordered(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_ordered");

    group.bench_function(BenchmarkId::new("BPlusTree", N), |b| {
        b.iter(|| {
            let mut tree = BPlusTree::default();
            for i in 0..N as i64 {
                tree.insert(i, i);
            }
            tree
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for i in 0..N as i64 {
                map.insert(i, i);
            }
            map
        });
    });

    group.finish();
}

fn bench_insert_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("insert_random");

    group.bench_function(BenchmarkId::new("BPlusTree", N), |b| {
        b.iter(|| filled_tree(&keys));
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.finish();
}

fn bench_insert_block_size(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("insert_random_by_block_size");

    for block_size in BLOCK_SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(block_size), &block_size, |b, &block_size| {
            b.iter(|| {
                let mut tree = BPlusTree::with_block_size(block_size).unwrap();
                for &k in &keys {
                    tree.insert(k, k);
                }
                tree
            });
        });
    }

    group.finish();
}

fn bench_upsert_counts(c: &mut Criterion) {
    // Many repeated keys, so most calls update in place.
    let keys: Vec<i64> = random_keys(N).into_iter().map(|k| k % 512).collect();
    let mut group = c.benchmark_group("upsert_counts");

    group.bench_function(BenchmarkId::new("BPlusTree", N), |b| {
        b.iter(|| {
            let mut tree = BPlusTree::default();
            for &k in &keys {
                tree.upsert(k, |count: Option<&u32>| count.map_or(1, |count| count + 1));
            }
            tree
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &k in &keys {
                *map.entry(k).or_insert(0u32) += 1;
            }
            map
        });
    });

    group.finish();
}

// ─── Search ─────────────────────────────────────────────────────────────────

fn bench_search_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let tree = filled_tree(&keys);
    let map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("search_random");

    group.bench_function(BenchmarkId::new("BPlusTree", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for &k in &keys {
                if let Some(&v) = tree.search(&k) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for &k in &keys {
                if let Some(&v) = map.get(&k) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.finish();
}

// ─── Delete ─────────────────────────────────────────────────────────────────

fn bench_delete_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("delete_random");

    group.bench_function(BenchmarkId::new("BPlusTree", N), |b| {
        b.iter_batched(
            || filled_tree(&keys),
            |mut tree| {
                for &k in &keys {
                    tree.delete(&k);
                }
                tree
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter_batched(
            || map.clone(),
            |mut map| {
                for &k in &keys {
                    map.remove(&k);
                }
                map
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ─── Iteration ──────────────────────────────────────────────────────────────

fn bench_scans(c: &mut Criterion) {
    let keys = ordered_keys(N);
    let tree = filled_tree(&keys);
    let map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let from = (N / 2) as i64;

    let mut group = c.benchmark_group("scan");

    group.bench_function(BenchmarkId::new("BPlusTree::keys", N), |b| {
        b.iter(|| tree.keys().fold(0i64, |sum, &k| sum.wrapping_add(k)));
    });

    group.bench_function(BenchmarkId::new("BPlusTree::values_rev", N), |b| {
        b.iter(|| tree.values_rev().fold(0i64, |sum, &v| sum.wrapping_add(v)));
    });

    group.bench_function(BenchmarkId::new("BPlusTree::greater_or_equal_values", N), |b| {
        b.iter(|| tree.greater_or_equal_values(&from).fold(0i64, |sum, &v| sum.wrapping_add(v)));
    });

    group.bench_function(BenchmarkId::new("BPlusTree::lesser_or_equal_values", N), |b| {
        b.iter(|| tree.lesser_or_equal_values(&from).fold(0i64, |sum, &v| sum.wrapping_add(v)));
    });

    group.bench_function(BenchmarkId::new("BTreeMap::keys", N), |b| {
        b.iter(|| map.keys().fold(0i64, |sum, &k| sum.wrapping_add(k)));
    });

    group.bench_function(BenchmarkId::new("BTreeMap::range", N), |b| {
        b.iter(|| map.range(from..).fold(0i64, |sum, (_, &v)| sum.wrapping_add(v)));
    });

    group.bench_function(BenchmarkId::new("BTreeMap::range_rev", N), |b| {
        b.iter(|| map.range(..=from).rev().fold(0i64, |sum, (_, &v)| sum.wrapping_add(v)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_ordered,
    bench_insert_random,
    bench_insert_block_size,
    bench_upsert_counts,
    bench_search_random,
    bench_delete_random,
    bench_scans,
);
criterion_main!(benches);
