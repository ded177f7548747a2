//! Property tests for detector, liquidity zone and trade plan invariants.

use chrono::{Duration, TimeZone, Utc};
use liquidity_matrix::prelude::*;
use proptest::prelude::*;

fn to_candles(raw: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
    let start = Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap();
    raw.iter()
        .enumerate()
        .map(|(i, &(base, delta, up, down))| {
            let open = base;
            let close = (base + delta).max(0.01);
            let high = open.max(close) + up;
            let low = (open.min(close) - down).max(0.0);
            Candle::new(start + Duration::minutes(15 * i as i64), open, high, low, close, 0.0)
        })
        .collect()
}

fn candle_strategy() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (1.0f64..5000.0, -20.0f64..20.0, 0.0f64..10.0, 0.0f64..10.0)
}

fn series_strategy(max_len: usize) -> impl Strategy<Value = Vec<Candle>> {
    prop::collection::vec(candle_strategy(), 0..max_len).prop_map(|raw| to_candles(&raw))
}

proptest! {
    #[test]
    fn short_series_is_insufficient(lookback in 2usize..=50, raw in prop::collection::vec(candle_strategy(), 0..52)) {
        let detector = SweepDetector {
            lookback: Period::new(lookback).unwrap(),
            ..SweepDetector::default()
        };
        let bars = to_candles(&raw[..raw.len().min(lookback + 1)]);
        prop_assert_eq!(detector.detect(&bars).reason(), Some(NoSignalReason::InsufficientData));
    }

    #[test]
    fn signals_are_well_formed(bars in series_strategy(60)) {
        let detector = SweepDetector::with_defaults();
        match detector.detect(&bars) {
            Detection::NoSignal { reason } => {
                if bars.len() < detector.min_bars() {
                    prop_assert_eq!(reason, NoSignalReason::InsufficientData);
                } else {
                    prop_assert_eq!(reason, NoSignalReason::NoPatternFound);
                }
            },
            Detection::Signal(signal) => {
                prop_assert!(signal.confirm.is_green());
                prop_assert!(signal.sweep.low < signal.confirm.low);
                prop_assert!(rejection_wick_ratio(&signal.sweep) > 0.4);
                prop_assert!(signal.offset_from_end >= 1);
                prop_assert!(signal.offset_from_end < detector.lookback.get());
            },
        }
    }

    #[test]
    fn liquidity_zone_is_tight(bars in series_strategy(120).prop_filter("non-empty", |b| !b.is_empty())) {
        let zone = LiquidityZone::from_window(&bars).unwrap();
        prop_assert!(bars.iter().all(|b| zone.recent_low <= b.low));
        prop_assert!(bars.iter().all(|b| zone.recent_high >= b.high));
        prop_assert!(bars.iter().any(|b| b.low == zone.recent_low));
        prop_assert!(bars.iter().any(|b| b.high == zone.recent_high));
        prop_assert_eq!(zone.last_close, bars[bars.len() - 1].close);
    }

    #[test]
    fn plans_keep_ordering_and_reward(
        low in 500.0f64..100_000.0,
        gap in 0.001f64..50.0,
        body in 0.0f64..50.0,
        crypto in any::<bool>(),
        risk_reward in 1.0f64..6.0,
    ) {
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap();
        let open = low + gap;
        let sweep = Candle::new(at, low + 1.0, low + 2.0, low, low + 0.5, 0.0);
        let confirm = Candle::new(at + Duration::minutes(15), open, open + body + 1.0, open, open + body, 0.0);
        let signal = SweepSignal { sweep, confirm, offset_from_end: 2 };

        let profile = (if crypto { InstrumentProfile::crypto() } else { InstrumentProfile::gold() })
            .with_risk_reward(risk_reward);
        let plan = build_trade_plan(&signal, &profile, "prop").unwrap();

        prop_assert!(plan.stop_loss < plan.entry);
        prop_assert!(plan.entry < plan.take_profit);
        prop_assert!(plan.tp1 <= plan.take_profit);

        // rounding moves each level by at most half a unit in the last place
        let tolerance = (risk_reward + 2.0) * 10f64.powi(-(profile.precision as i32));
        let expected = (plan.entry - plan.stop_loss) * risk_reward;
        prop_assert!((plan.reward() - expected).abs() <= tolerance);
    }
}
