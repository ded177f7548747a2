//! Integration tests for sweep detection, liquidity zones and plan building.

use chrono::{Duration, TimeZone, Utc};
use liquidity_matrix::prelude::*;

fn candles(ohlc: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
    let start = Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap();
    ohlc.iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| Candle::new(start + Duration::minutes(15 * i as i64), o, h, l, c, 0.0))
        .collect()
}

/// Nine 15m gold candles; index 5 sweeps to 1800 with a 60% lower wick and
/// index 6 confirms green from 1801.5 to 1803.
fn gold_scenario() -> Vec<Candle> {
    candles(&[
        (1812.0, 1814.0, 1810.0, 1813.0),
        (1813.0, 1815.0, 1811.0, 1812.0),
        (1812.0, 1813.0, 1808.0, 1809.0),
        (1809.0, 1810.0, 1806.0, 1807.0),
        (1807.0, 1808.0, 1805.0, 1806.0),
        (1803.0, 1805.0, 1800.0, 1802.0),
        (1801.5, 1804.0, 1801.0, 1803.0),
        (1803.0, 1806.0, 1802.5, 1805.0),
        (1805.0, 1807.0, 1804.0, 1806.0),
    ])
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
}

#[test]
fn test_gold_scenario_end_to_end() {
    let bars = gold_scenario();
    assert!((bars[5].lower_shadow() + bars[5].body()) / bars[5].range() > 0.59);

    let detection = SweepDetector::with_defaults().detect(&bars);
    let signal = detection.signal().expect("sweep should fire");
    assert_eq!(signal.sweep, bars[5]);
    assert_eq!(signal.confirm, bars[6]);
    assert_eq!(signal.offset_from_end, 3);

    let plan = build_trade_plan(signal, &InstrumentProfile::gold(), "test").unwrap();
    assert_eq!(plan.side, Side::Long);
    assert_close(plan.stop_loss, 1799.80);
    assert_close(plan.entry, 1801.52);
    assert_close(plan.take_profit, 1808.40);
    assert_close(plan.tp1, 1803.24);
    assert_close(plan.risk(), 1.72);
    assert_eq!(plan.confidence, 0.80);
}

#[test]
fn test_gold_scenario_through_series_analyzer() {
    let coarse = CandleSeries::new("XAU/USD", Interval::FifteenMinutes, gold_scenario()).unwrap();
    let fine = CandleSeries::new("XAU/USD", Interval::FiveMinutes, gold_scenario()).unwrap();
    let analyzer =
        SeriesAnalyzer::new(AnalysisConfig::default(), ProfileRegistry::default()).unwrap();

    let analysis = analyzer.evaluate("XAU/USD", &coarse, &fine).unwrap();
    let plan = analysis.plan.plan().expect("plan should be ready");
    assert_close(plan.entry, 1801.52);
    assert_eq!(plan.rationale, "Sweep detected + green confirm on 15m");

    assert_eq!(analysis.liquidity.recent_low, 1800.0);
    assert_eq!(analysis.liquidity.recent_high, 1815.0);
    assert_eq!(analysis.liquidity.last_close, 1806.0);
    assert_eq!(analysis.liquidity_candles, 9);
    assert_eq!(analysis.latest_coarse.close, 1806.0);
}

#[test]
fn test_unknown_symbol_uses_fallback_profile() {
    let coarse = CandleSeries::new("XAG/USD", Interval::FifteenMinutes, gold_scenario()).unwrap();
    let analyzer =
        SeriesAnalyzer::new(AnalysisConfig::default(), ProfileRegistry::default()).unwrap();

    // crypto stop of 350 on a 1800 instrument
    let analysis = analyzer.evaluate("XAG/USD", &coarse, &coarse).unwrap();
    let plan = analysis.plan.plan().unwrap();
    assert_close(plan.stop_loss, 1450.0);
    assert_eq!(plan.confidence, 0.75);
}

#[test]
fn test_earliest_of_two_sweeps_wins() {
    let bars = candles(&[
        (110.0, 111.0, 109.0, 110.5),
        (110.0, 111.0, 108.5, 110.2),
        (107.0, 108.0, 106.0, 107.5),
        (106.0, 106.5, 101.0, 105.0), // first sweep
        (105.0, 107.0, 104.0, 106.8),
        (106.8, 107.5, 103.0, 106.0),
        (104.0, 104.5, 100.0, 103.0), // second sweep, deeper
        (103.0, 105.0, 102.0, 104.8),
        (104.8, 106.0, 104.0, 105.5),
    ]);

    let detection = SweepDetector::with_defaults().detect(&bars);
    let signal = detection.signal().unwrap();
    assert_eq!(signal.sweep, bars[3]);
    assert_eq!(signal.confirm, bars[4]);
    assert_eq!(signal.offset_from_end, 5);

    // once the first low is no longer a local minimum, the second is found
    let mut trimmed = bars.clone();
    trimmed[3] = Candle { low: 104.5, ..bars[3] };
    let detection = SweepDetector::with_defaults().detect(&trimmed);
    let signal = detection.signal().unwrap();
    assert_eq!(signal.sweep, bars[6]);
    assert_eq!(signal.offset_from_end, 2);
}

#[test]
fn test_sweep_outside_window_ignored() {
    let mut bars = gold_scenario();
    // push the sweep out of the trailing seven candles
    let extra = candles(&[
        (1806.0, 1808.0, 1805.0, 1807.0),
        (1807.0, 1809.0, 1806.0, 1808.0),
        (1808.0, 1810.0, 1807.0, 1809.0),
        (1809.0, 1811.0, 1808.0, 1810.0),
    ]);
    let last = bars.last().unwrap().timestamp;
    bars.extend(extra.into_iter().enumerate().map(|(i, c)| Candle {
        timestamp: last + Duration::minutes(15 * (i as i64 + 1)),
        ..c
    }));

    assert_eq!(
        SweepDetector::with_defaults().detect(&bars).reason(),
        Some(NoSignalReason::NoPatternFound)
    );
    assert!(CandleSeries::new("XAU/USD", Interval::FifteenMinutes, bars).is_ok());
}

#[test]
fn test_engulfing_examples() {
    let bars = candles(&[(10.0, 10.2, 8.9, 9.0), (8.5, 10.6, 8.4, 10.5)]);
    assert!(is_bullish_engulfing(&bars[0], &bars[1]));
    assert!(latest_is_bullish_engulfing(&bars));

    let inside = candles(&[(10.0, 10.2, 8.9, 9.0), (9.5, 10.6, 9.4, 10.5)]);
    assert!(!is_bullish_engulfing(&inside[0], &inside[1]));
}

#[test]
fn test_liquidity_zone_on_trailing_window() {
    let bars = gold_scenario();
    let zone = LiquidityZone::from_window(&bars[4..]).unwrap();
    assert_eq!(zone.recent_low, 1800.0);
    assert_eq!(zone.recent_high, 1808.0);
    assert_eq!(zone.last_close, 1806.0);

    let empty: [Candle; 0] = [];
    assert!(LiquidityZone::from_window(&empty).is_err());
}

#[test]
fn test_custom_detector_parameters() {
    let bars = gold_scenario();
    // 0.6 wick no longer clears a 0.65 threshold
    let strict = SweepDetector {
        min_wick_ratio: Ratio::new(0.65).unwrap(),
        ..SweepDetector::default()
    };
    assert_eq!(strict.detect(&bars).reason(), Some(NoSignalReason::NoPatternFound));

    let short = SweepDetector {
        lookback: Period::new(3).unwrap(),
        ..SweepDetector::default()
    };
    // window of four: sweep at 5 is its first candle and cannot qualify
    assert_eq!(short.detect(&bars).reason(), Some(NoSignalReason::NoPatternFound));
}
