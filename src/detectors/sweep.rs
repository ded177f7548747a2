//! Liquidity sweep detector
//!
//! Models a stop-hunt below a recent low followed by a reversal: a candle
//! that prints a strict local low with a long rejection wick, and a green
//! candle right after it. Only OHLC shape is used; volume is ignored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::helpers::{
    is_local_low, rejection_wick_ratio, DEFAULT_LOOKBACK, DEFAULT_MIN_WICK_RATIO,
};
use crate::{
    candle::Candle,
    params::{get_period, get_ratio, ParamMeta, ParameterizedDetector},
    OHLCVExt, Period, Ratio, Result, OHLCV,
};

// ============================================================
// DETECTION RESULT
// ============================================================

/// Why a scan produced no signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoSignalReason {
    InsufficientData,
    NoPatternFound,
}

impl NoSignalReason {
    pub fn as_str(self) -> &'static str {
        match self {
            NoSignalReason::InsufficientData => "insufficient_data",
            NoSignalReason::NoPatternFound => "no_pattern_found",
        }
    }
}

/// Sweep candle, its confirmation, and where the sweep sits in the window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSignal<T = Candle> {
    pub sweep: T,
    pub confirm: T,
    /// Candles from the sweep to the end of the scanned window, counting the sweep's successor
    pub offset_from_end: usize,
}

/// Outcome of a sweep scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Detection<T = Candle> {
    NoSignal { reason: NoSignalReason },
    Signal(SweepSignal<T>),
}

impl<T> Detection<T> {
    #[inline]
    pub fn is_signal(&self) -> bool {
        matches!(self, Detection::Signal(_))
    }

    pub fn signal(&self) -> Option<&SweepSignal<T>> {
        match self {
            Detection::Signal(s) => Some(s),
            Detection::NoSignal { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<NoSignalReason> {
        match self {
            Detection::Signal(_) => None,
            Detection::NoSignal { reason } => Some(*reason),
        }
    }
}

// ============================================================
// DETECTOR
// ============================================================

/// Sweep + green confirmation over a bounded trailing window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepDetector {
    /// Candles scanned before the newest one; the window holds `lookback + 1`
    pub lookback: Period,
    /// Rejection wick share of range that must be exceeded
    pub min_wick_ratio: Ratio,
}

impl Default for SweepDetector {
    fn default() -> Self {
        Self {
            lookback: Period::new_const(DEFAULT_LOOKBACK),
            min_wick_ratio: Ratio::new_const(DEFAULT_MIN_WICK_RATIO),
        }
    }
}

impl SweepDetector {
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Shortest series the detector will scan
    #[inline]
    pub fn min_bars(&self) -> usize {
        self.lookback.get().saturating_add(2)
    }

    /// Scan the trailing `lookback + 1` candles, oldest candidate first.
    ///
    /// The first qualifying sweep wins, even when a later one also qualifies.
    pub fn detect<T: OHLCV + Clone>(&self, bars: &[T]) -> Detection<T> {
        if bars.len() < self.min_bars() {
            return Detection::NoSignal {
                reason: NoSignalReason::InsufficientData,
            };
        }

        // len >= lookback + 2 here, so the window never reaches past the start
        let span = self.lookback.get().saturating_add(1);
        let window = &bars[bars.len() - span..];
        for i in 1..window.len() - 1 {
            if !is_local_low(window, i) {
                continue;
            }
            if rejection_wick_ratio(&window[i]) <= self.min_wick_ratio.get() {
                continue;
            }
            let confirm = &window[i + 1];
            if confirm.is_green() {
                return Detection::Signal(SweepSignal {
                    sweep: window[i].clone(),
                    confirm: confirm.clone(),
                    offset_from_end: window.len() - (i + 1),
                });
            }
        }

        Detection::NoSignal {
            reason: NoSignalReason::NoPatternFound,
        }
    }
}

// ============================================================
// PARAMETER METADATA
// ============================================================

const SWEEP_PARAMS: &[ParamMeta] = &[
    ParamMeta::period("lookback", DEFAULT_LOOKBACK as f64, (2.0, 50.0)),
    ParamMeta::ratio("min_wick_ratio", DEFAULT_MIN_WICK_RATIO, (0.05, 0.95)),
];

impl ParameterizedDetector for SweepDetector {
    fn param_meta() -> &'static [ParamMeta] {
        SWEEP_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        for meta in SWEEP_PARAMS {
            if let Some(value) = params.get(meta.name) {
                meta.validate(*value)?;
            }
        }
        Ok(Self {
            lookback: get_period(params, "lookback", DEFAULT_LOOKBACK)?,
            min_wick_ratio: get_ratio(params, "min_wick_ratio", DEFAULT_MIN_WICK_RATIO)?,
        })
    }
}
