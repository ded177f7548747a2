//! Benchmarks for sweep detection and per-symbol analysis.

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use liquidity_matrix::prelude::*;

/// Deterministic pseudo-random candles, 15 minutes apart
fn generate_candles(n: usize) -> Vec<Candle> {
  let start = Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap();
  let mut candles = Vec::with_capacity(n);
  let mut price = 2000.0;

  for i in 0..n {
    let change = ((i * 7 + 13) % 100) as f64 / 50.0 - 1.0;
    let volatility = 2.0 + ((i * 3) % 10) as f64 / 5.0;

    let o = price;
    let c = price + change;
    let h = o.max(c) + volatility * 0.5;
    let l = o.min(c) - volatility * 0.5;

    candles.push(Candle::new(start + Duration::minutes(15 * i as i64), o, h, l, c, 0.0));
    price = c;
  }

  candles
}

fn series(symbol: &str, interval: Interval, n: usize) -> CandleSeries {
  CandleSeries::new(symbol, interval, generate_candles(n)).unwrap()
}

fn bench_detect(c: &mut Criterion) {
  let candles = generate_candles(200);
  let detector = SweepDetector::with_defaults();

  c.bench_function("sweep_detect_200_candles", |b| {
    b.iter(|| {
      let _ = black_box(detector.detect(black_box(&candles)));
    })
  });
}

fn bench_lookback_scaling(c: &mut Criterion) {
  let candles = generate_candles(200);
  let mut group = c.benchmark_group("lookback");

  for lookback in [6, 12, 24, 48].iter() {
    let detector = SweepDetector {
      lookback: Period::new(*lookback).unwrap(),
      ..SweepDetector::default()
    };
    group.bench_with_input(BenchmarkId::new("detect", lookback), lookback, |b, _| {
      b.iter(|| {
        let _ = black_box(detector.detect(black_box(&candles)));
      })
    });
  }

  group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
  let analyzer = SeriesAnalyzer::new(AnalysisConfig::default(), ProfileRegistry::default()).unwrap();
  let coarse = series("XAU/USD", Interval::FifteenMinutes, 200);
  let fine = series("XAU/USD", Interval::FiveMinutes, 200);

  c.bench_function("evaluate_one_symbol", |b| {
    b.iter(|| {
      let _ = black_box(analyzer.evaluate("XAU/USD", black_box(&coarse), black_box(&fine)));
    })
  });
}

fn bench_evaluate_parallel(c: &mut Criterion) {
  let analyzer = SeriesAnalyzer::new(AnalysisConfig::default(), ProfileRegistry::default()).unwrap();
  let symbols = ["XAU/USD", "BTC/USD", "ETH/USD", "XAG/USD"];
  let data: Vec<(CandleSeries, CandleSeries)> = symbols
    .iter()
    .map(|s| {
      (series(s, Interval::FifteenMinutes, 200), series(s, Interval::FiveMinutes, 200))
    })
    .collect();

  let instruments: Vec<(&str, &CandleSeries, &CandleSeries)> =
    symbols.iter().zip(&data).map(|(s, (coarse, fine))| (*s, coarse, fine)).collect();

  c.bench_function("evaluate_parallel_4_symbols", |b| {
    b.iter(|| {
      let _ = black_box(evaluate_parallel(black_box(&analyzer), instruments.clone()));
    })
  });
}

criterion_group!(
  benches,
  bench_detect,
  bench_lookback_scaling,
  bench_evaluate,
  bench_evaluate_parallel
);
criterion_main!(benches);
