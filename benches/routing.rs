//! Benchmarks for routing decisions with varying worker counts.
//!
//! Ranking and selection are pure; a decision must stay well under 1ms.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dispatcher::complexity::{ComplexityEstimate, ComplexityLevel, HeuristicClassifier};
use dispatcher::routing::{decide, rank, CostEstimate};
use dispatcher::worker::WorkerId;

fn create_estimate(id: usize) -> CostEstimate {
    let available = ((id * 37) % 100) as f64;
    CostEstimate {
        worker: WorkerId::new(format!("worker-{}", id)),
        worker_name: format!("Worker {}", id),
        estimated_cost: if id % 3 == 0 { 0.0 } else { 0.01 * (id % 7) as f64 },
        estimated_tokens: 500,
        available_percent: available,
        current_spend: 0.0,
        will_exceed_limit: available < 10.0,
        is_available: available >= 5.0,
        confidence: 0.6,
    }
}

fn create_estimates(count: usize) -> Vec<CostEstimate> {
    (0..count).map(create_estimate).collect()
}

/// Benchmark the total-order ranking with varying worker counts.
fn bench_rank_by_worker_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");

    for count in [3, 10, 50, 200] {
        let estimates = create_estimates(count);
        group.bench_with_input(BenchmarkId::new("workers", count), &count, |b, _| {
            b.iter(|| {
                black_box(rank(black_box(&estimates)));
            });
        });
    }

    group.finish();
}

/// Benchmark the full decision: filter, rank and explain.
fn bench_decide_by_worker_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("decide");
    let complexity = ComplexityEstimate::new(ComplexityLevel::Medium, 500, 0.6, "heuristic");

    for count in [3, 10, 50, 200] {
        let estimates = create_estimates(count);
        group.bench_with_input(BenchmarkId::new("workers", count), &count, |b, _| {
            b.iter(|| {
                black_box(decide(&estimates, &complexity, None).unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark a forced decision, which skips filtering but still ranks.
fn bench_forced_decision(c: &mut Criterion) {
    let estimates = create_estimates(50);
    let complexity = ComplexityEstimate::new(ComplexityLevel::Complex, 2000, 0.6, "heuristic");
    let forced = WorkerId::new("worker-7");

    c.bench_function("decide_forced_50_workers", |b| {
        b.iter(|| {
            black_box(decide(&estimates, &complexity, Some(&forced)).unwrap());
        });
    });
}

/// Benchmark the keyword classifier on short and long tasks.
fn bench_classifier(c: &mut Criterion) {
    let classifier = HeuristicClassifier;
    let short = "fix typo in readme";
    let long = "refactor the authentication layer to support multiple identity providers, \
                migrate the session store, and redesign the permission model for teams";

    c.bench_function("classify_short_task", |b| {
        b.iter(|| black_box(classifier.classify(black_box(short))));
    });
    c.bench_function("classify_long_task", |b| {
        b.iter(|| black_box(classifier.classify(black_box(long))));
    });
}

criterion_group!(
    benches,
    bench_rank_by_worker_count,
    bench_decide_by_worker_count,
    bench_forced_decision,
    bench_classifier,
);
criterion_main!(benches);
