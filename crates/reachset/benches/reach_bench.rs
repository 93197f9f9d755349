//! Criterion benchmarks for the per-step hot paths: polygon propagation and
//! grid repartition.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use reachset::geometry::{ReachPolygon, Rect};
use reachset::reach::propagation::{propagate_polygon, zero_state_polygon};
use reachset::reach::repartition::create_repartitioned_rectangles;

fn overlapping_rectangles(n: usize) -> Vec<Rect> {
    // Deterministic chain of overlapping rectangles marching diagonally.
    (0..n)
        .map(|i| {
            let base = i as f64 * 0.8;
            Rect::new(base, base * 0.3, base + 2.5, base * 0.3 + 1.5)
        })
        .collect()
}

fn bench_propagation(c: &mut Criterion) {
    let zero_state = zero_state_polygon(0.5, -6.0, 6.0).expect("zero-state polygon");
    let base = ReachPolygon::from_rectangle(10.0, 0.0, 30.0, 20.0).expect("base polygon");

    c.bench_function("propagate_polygon", |b| {
        b.iter_batched(
            || base.clone(),
            |polygon| propagate_polygon(&polygon, &zero_state, 0.5, 0.0, 40.0),
            BatchSize::SmallInput,
        )
    });
}

fn bench_repartition(c: &mut Criterion) {
    let mut group = c.benchmark_group("repartition");
    for &n in &[10usize, 50, 200] {
        group.bench_with_input(BenchmarkId::new("create_repartitioned", n), &n, |b, &n| {
            let rectangles = overlapping_rectangles(n);
            b.iter(|| create_repartitioned_rectangles(&rectangles, 0.25))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_propagation, bench_repartition);
criterion_main!(benches);
