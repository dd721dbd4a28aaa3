//! # Search Strategy Benchmarks
//!
//! Wall time of exhaustive enumeration, greedy hill climbing and the
//! tunnelling walk on the same rugged landscape. Solution quality for the
//! same setups is checked in `tests/search_tests.rs`; the numbers here say
//! what that quality costs.
//!
//! Run: `cargo bench --bench search_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use qsim::search::{compare_strategies, exhaustive_search, hill_climb, PossibilitySpace, SearchEngine};

/// Sawtooth of local peaks rising towards a single global peak at 3/4 of the range
fn landscape(size: usize) -> PossibilitySpace {
    let peak = 3 * size / 4;
    let entries = (0..size).map(|i| {
        let local = (i % 7) as f64;
        let trend = 20.0 - (i as f64 - peak as f64).abs() * 40.0 / size as f64;
        (format!("opt{}", i), local + trend.max(0.0) * if i == peak { 2.0 } else { 1.0 })
    });
    PossibilitySpace::new(entries).unwrap()
}

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_strategies");
    for size in [100usize, 1_000, 10_000] {
        let space = landscape(size);
        group.bench_with_input(BenchmarkId::new("exhaustive", size), &space, |b, space| {
            b.iter(|| black_box(exhaustive_search(space)))
        });
        group.bench_with_input(BenchmarkId::new("hill_climb", size), &space, |b, space| {
            b.iter(|| black_box(hill_climb(space, 0).unwrap()))
        });
        let mut engine = SearchEngine::seeded(9);
        group.bench_with_input(BenchmarkId::new("tunnel_1000_steps", size), &space, |b, space| {
            b.iter(|| black_box(engine.tunnel_search(space, 1_000).unwrap()))
        });
    }
    group.finish();
}

/// Full comparison harness, printing the quality numbers once per size
fn bench_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("strategy_comparison");
    group.sample_size(10);
    for size in [100usize, 1_000] {
        let space = landscape(size);
        let mut engine = SearchEngine::seeded(1);
        let report = compare_strategies(&mut engine, &space, 2_000, 20).unwrap();
        println!(
            "size {}: hill_climb hit rate {:.2}, tunnel hit rate {:.2}",
            size, report.hill_climb.hit_rate, report.tunnel.hit_rate
        );
        group.bench_with_input(BenchmarkId::from_parameter(size), &space, |b, space| {
            b.iter(|| black_box(compare_strategies(&mut engine, space, 500, 5).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_strategies, bench_comparison);
criterion_main!(benches);
