//! Criterion benchmarks for the structure hot paths.
//!
//! Benchmarks:
//! 1. Swing detection over growing windows
//! 2. Full single-timeframe evaluation (both confirmation rules)
//! 3. Three-timeframe pair evaluation plus decision fusion

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use structlab_core::alignment::AlignmentResult;
use structlab_core::data::{CandleProvider, SyntheticProvider};
use structlab_core::decision::{decide, PairStructure, TimeframeSeries};
use structlab_core::domain::{closes, Candle, Direction, Timeframe};
use structlab_core::structure::{detect_swings, ConfirmationRule, StructureEvaluator};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_candles(symbol: &str, timeframe: Timeframe, n: usize) -> Vec<Candle> {
    SyntheticProvider::new(42)
        .fetch_candles(symbol, timeframe, n)
        .unwrap_or_default()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_swings(c: &mut Criterion) {
    let mut group = c.benchmark_group("swing_detection");

    for &n in &[300, 1_000, 5_000] {
        let series = closes(&make_candles("EUR/USD", Timeframe::H1, n));
        group.bench_with_input(BenchmarkId::new("lookback_3", n), &n, |b, _| {
            b.iter(|| detect_swings(black_box(&series), 3));
        });
    }

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("structure_evaluation");
    let candles = make_candles("EUR/USD", Timeframe::M15, 300);

    for (name, rule) in [
        ("pass_through", ConfirmationRule::PassThrough),
        ("candle_pattern", ConfirmationRule::CandlePattern),
    ] {
        let Ok(evaluator) = StructureEvaluator::new(3, rule) else {
            continue;
        };
        group.bench_function(name, |b| {
            b.iter(|| evaluator.evaluate(black_box(&candles), Timeframe::M15));
        });
    }

    group.finish();
}

fn bench_decision(c: &mut Criterion) {
    let mut group = c.benchmark_group("decision_fusion");
    let timeframes = [Timeframe::H1, Timeframe::M30, Timeframe::M15];
    let series: Vec<TimeframeSeries> = timeframes
        .iter()
        .map(|&tf| TimeframeSeries { timeframe: tf, candles: make_candles("EUR/USD", tf, 300) })
        .collect();
    let index = AlignmentResult::Aligned {
        direction: Direction::Bearish,
        timeframes: vec![Timeframe::H1, Timeframe::M30],
    };
    let evaluator = StructureEvaluator::default();

    group.bench_function("eur_usd_3_timeframes_300_candles", |b| {
        b.iter(|| {
            let pair = PairStructure::evaluate(black_box(series.clone()), &evaluator);
            decide("EUR/USD", &pair, &index)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_swings, bench_evaluate, bench_decision);
criterion_main!(benches);
