//! Liquidity zone: recent extremes of a candle window.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, OHLCV};

/// Minimum low, maximum high and last close of a window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidityZone {
    pub recent_low: f64,
    pub recent_high: f64,
    pub last_close: f64,
}

impl LiquidityZone {
    /// Single pass over `bars`. Fails on an empty window.
    pub fn from_window<T: OHLCV>(bars: &[T]) -> Result<Self> {
        let last = bars
            .last()
            .ok_or(Error::InvalidInput("liquidity window is empty"))?;

        let (recent_low, recent_high) = bars.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(low, high), bar| (low.min(bar.low()), high.max(bar.high())),
        );

        Ok(Self {
            recent_low,
            recent_high,
            last_close: last.close(),
        })
    }
}
