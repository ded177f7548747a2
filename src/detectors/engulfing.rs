//! Bullish engulfing check over two consecutive candles.
//!
//! Not part of the sweep pipeline; kept as a standalone primitive.

use crate::{OHLCVExt, OHLCV};

/// `prev` red, `latest` green, and the latest real body contains the previous one.
#[inline]
pub fn is_bullish_engulfing<T: OHLCV>(prev: &T, latest: &T) -> bool {
    prev.is_red()
        && latest.is_green()
        && latest.close() > prev.open()
        && latest.open() < prev.close()
}

/// Bullish engulfing on the two newest candles. False with fewer than two.
pub fn latest_is_bullish_engulfing<T: OHLCV>(bars: &[T]) -> bool {
    match bars {
        [.., prev, latest] => is_bullish_engulfing(prev, latest),
        _ => false,
    }
}
