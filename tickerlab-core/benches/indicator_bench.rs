//! Criterion benchmarks for analysis hot paths.
//!
//! Benchmarks:
//! 1. Full indicator battery over series of increasing length
//! 2. Level detection
//! 3. Backtest replay
//! 4. Metrics snapshot

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tickerlab_core::backtest::{run_backtest, StrategyParams};
use tickerlab_core::data::synthetic_series;
use tickerlab_core::indicators::IndicatorSpec;
use tickerlab_core::levels::{detect_levels, LevelConfig};
use tickerlab_core::snapshot::MetricsSnapshot;

const SIZES: [usize; 3] = [250, 1_000, 5_000];

fn bench_battery(c: &mut Criterion) {
    let battery = IndicatorSpec::default_battery();
    let mut group = c.benchmark_group("indicator_battery");
    for n in SIZES {
        let bars = synthetic_series(1, n, 100.0);
        group.bench_with_input(BenchmarkId::from_parameter(n), &bars, |b, bars| {
            b.iter(|| {
                for spec in &battery {
                    black_box(spec.compute(black_box(bars)).ok());
                }
            })
        });
    }
    group.finish();
}

fn bench_levels(c: &mut Criterion) {
    let config = LevelConfig::default();
    let mut group = c.benchmark_group("detect_levels");
    for n in SIZES {
        let bars = synthetic_series(2, n, 100.0);
        group.bench_with_input(BenchmarkId::from_parameter(n), &bars, |b, bars| {
            b.iter(|| black_box(detect_levels(black_box(bars), &config)))
        });
    }
    group.finish();
}

fn bench_backtest(c: &mut Criterion) {
    let params = StrategyParams::default();
    let mut group = c.benchmark_group("backtest");
    for n in SIZES {
        let bars = synthetic_series(3, n, 100.0);
        group.bench_with_input(BenchmarkId::from_parameter(n), &bars, |b, bars| {
            b.iter(|| black_box(run_backtest(black_box(bars), &params).ok()))
        });
    }
    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let bars = synthetic_series(4, 1_000, 100.0);
    c.bench_function("metrics_snapshot_1000", |b| {
        b.iter(|| black_box(MetricsSnapshot::from_bars(black_box(&bars))))
    });
}

criterion_group!(benches, bench_battery, bench_levels, bench_backtest, bench_snapshot);
criterion_main!(benches);
