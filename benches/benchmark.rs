use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use stravl::AvlTree;

const N: usize = 100_000;

pub fn benchmarks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let values: Vec<String> = (1..=N).map(|_| format!("{:08x}", rng.gen::<u32>())).collect();

    c.bench_function("tree_insert", |b| {
        b.iter(|| {
            let mut tree = AvlTree::new();
            for value in &values {
                tree.insert(value).unwrap();
            }
            tree
        })
    });

    let mut tree = AvlTree::new();
    for value in &values {
        tree.insert(value).unwrap();
    }

    c.bench_function("tree_retrieve", |b| {
        b.iter(|| {
            for value in &values {
                black_box(tree.retrieve(value));
            }
        })
    });

    c.bench_function("tree_iter", |b| {
        b.iter(|| {
            for key in &tree {
                black_box(key);
            }
        })
    });

    c.bench_function("tree_infix", |b| {
        b.iter(|| {
            for entry in tree.infix() {
                black_box(entry);
            }
        })
    });
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
