//! B+ tree insert/get/remove/range benchmarks (§4.1).

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tinysql::btree::BPlusTree;

fn populated_tree(order: usize, count: usize) -> BPlusTree<i32> {
    let mut tree = BPlusTree::new(order).unwrap();
    for i in 0..count {
        tree.insert(&format!("{i:08}"), i as i32).unwrap();
    }
    tree
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for count in [100usize, 1_000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let mut tree = BPlusTree::new(4).unwrap();
                for i in 0..count {
                    tree.insert(&format!("{i:08}"), black_box(i as i32)).unwrap();
                }
                black_box(tree);
            });
        });
    }
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");
    for count in [100usize, 1_000, 10_000].iter() {
        let tree = populated_tree(4, *count);
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                black_box(tree.get(&format!("{:08}", count / 2)).unwrap());
            });
        });
    }
    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove");
    group.sample_size(20);
    for count in [100usize, 1_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter_batched(
                || populated_tree(4, count),
                |mut tree| {
                    for i in 0..count {
                        black_box(tree.remove(&format!("{i:08}")).unwrap());
                    }
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("range");
    for count in [100usize, 1_000, 10_000].iter() {
        let tree = populated_tree(4, *count);
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let lo = format!("{:08}", count / 4);
            let hi = format!("{:08}", 3 * count / 4);
            b.iter(|| {
                black_box(tree.range(&lo, &hi));
            });
        });
    }
    group.finish();
}

fn bench_full_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_scan");
    for count in [100usize, 1_000, 10_000].iter() {
        let tree = populated_tree(4, *count);
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| {
                black_box(tree.full_scan());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_get, bench_remove, bench_range, bench_full_scan);
criterion_main!(benches);
