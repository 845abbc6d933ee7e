//! Criterion benchmarks for a single batch step

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use sapling_engine::test_tree::build_bushy;
use sapling_engine::SlotProbabilities;

fn benchmark_advance_bushy(c: &mut Criterion) {
    let probs = SlotProbabilities::uniform(0.5).unwrap();
    for depth in [6u32, 10] {
        c.bench_function(&format!("advance_bushy_depth_{depth}"), |b| {
            b.iter_batched(
                || (build_bushy(probs, depth), SmallRng::seed_from_u64(42)),
                |(mut tree, mut rng)| {
                    tree.advance(&mut rng);
                    black_box(tree.height());
                },
                BatchSize::SmallInput,
            )
        });
    }
}

fn benchmark_plan_only(c: &mut Criterion) {
    let tree = build_bushy(SlotProbabilities::uniform(0.5).unwrap(), 10);
    let mut rng = SmallRng::seed_from_u64(7);
    c.bench_function("plan_step_depth_10", |b| {
        b.iter(|| black_box(tree.plan_step(&mut rng)))
    });
}

criterion_group!(benches, benchmark_advance_bushy, benchmark_plan_only);
criterion_main!(benches);
