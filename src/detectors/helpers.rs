//! Shared thresholds and candle-shape helpers for the detectors.

use crate::{OHLCVExt, OHLCV};

// ============================================================
// THRESHOLDS
// ============================================================

/// Default number of candles scanned before the newest one
pub const DEFAULT_LOOKBACK: usize = 6;
/// Rejection wick must cover more than this share of the candle range
pub const DEFAULT_MIN_WICK_RATIO: f64 = 0.4;
/// Stand-in range for flat candles, keeps the wick ratio finite
pub const RANGE_FLOOR: f64 = 1e-6;

// ============================================================
// HELPER FUNCTIONS
// ============================================================

/// Distance from the low up to the open on bearish candles, otherwise up to
/// the close. Includes the body.
#[inline]
pub fn rejection_wick<T: OHLCV>(bar: &T) -> f64 {
    if bar.open() > bar.close() {
        bar.open() - bar.low()
    } else {
        bar.close() - bar.low()
    }
}

/// [`rejection_wick`] as a share of the candle range.
#[inline]
pub fn rejection_wick_ratio<T: OHLCV>(bar: &T) -> f64 {
    let range = bar.range();
    let range = if range > 0.0 { range } else { RANGE_FLOOR };
    rejection_wick(bar) / range
}

/// Strict local minimum by low price. `index` needs both neighbours.
#[inline]
pub fn is_local_low<T: OHLCV>(bars: &[T], index: usize) -> bool {
    if index == 0 || index + 1 >= bars.len() {
        return false;
    }
    let low = bars[index].low();
    low < bars[index - 1].low() && low < bars[index + 1].low()
}
