//! # Liquidity Matrix
//!
//! Liquidity-sweep detection and trade-plan alerts for gold and crypto.
//!
//! The core is a set of pure functions over an in-memory candle series: a
//! sweep detector (local low with a long rejection wick, confirmed by a green
//! candle), a liquidity zone calculator, an auxiliary bullish engulfing check
//! and a trade plan builder driven by per-instrument profiles. Around it sit
//! thin adapters for market data (TwelveData), notifications (Telegram), a
//! timezone-aware session schedule and the alert service that ties them up.
//!
//! ## Quick Start
//!
//! ```rust
//! use liquidity_matrix::prelude::*;
//!
//! // Bring your own OHLCV type
//! #[derive(Clone)]
//! struct Bar { o: f64, h: f64, l: f64, c: f64 }
//!
//! impl OHLCV for Bar {
//!     fn open(&self) -> f64 { self.o }
//!     fn high(&self) -> f64 { self.h }
//!     fn low(&self) -> f64 { self.l }
//!     fn close(&self) -> f64 { self.c }
//!     fn volume(&self) -> f64 { 0.0 }
//! }
//!
//! let bars: Vec<Bar> = vec![];
//! let detection = SweepDetector::with_defaults().detect(&bars);
//! assert_eq!(detection.reason(), Some(NoSignalReason::InsufficientData));
//! ```

pub mod analysis;
pub mod candle;
pub mod config;
pub mod detectors;
pub mod notify;
pub mod params;
pub mod plan;
pub mod provider;
pub mod report;
pub mod schedule;
pub mod service;

pub mod prelude {
    pub use crate::{
        // Orchestration
        analysis::{
            evaluate_parallel, Analysis, AnalysisConfig, AnalysisOutcome, Analyzer,
            AnalyzerBuilder, EvaluationError, PlanStatus, SeriesAnalyzer,
        },
        // Data model
        candle::{Candle, CandleSeries, Interval},
        // Detectors
        detectors::*,
        // Adapters
        notify::Notifier,
        // Parameters
        params::{get_period, get_ratio, ParamMeta, ParamType, ParameterizedDetector},
        plan::{build_trade_plan, InstrumentProfile, ProfileRegistry, Side, TradePlan},
        provider::MarketDataProvider,
        report::{format_report, format_session_header},
        schedule::{AlertKind, SessionSchedule, Trigger},
        // Errors
        Error,
        // Core traits
        OHLCVExt,
        Period,
        Ratio,
        Result,
        OHLCV,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the core and its adapters
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("Invalid candle at index {index}: {reason}")]
    InvalidCandle { index: usize, reason: &'static str },

    #[error("data_fetch_error: {0}")]
    DataFetch(String),

    #[error("Invalid plan: expected stop_loss {stop_loss} < entry {entry} < take_profit {take_profit}")]
    InvalidPlan {
        entry: f64,
        stop_loss: f64,
        take_profit: f64,
    },

    #[error("Notification failed: {0}")]
    Notify(String),
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(Error::InvalidValue("Ratio cannot be NaN or infinite"));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Ratio from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Period (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(Error::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLCV data trait
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;

    /// Unix seconds, when the type carries a timestamp
    fn timestamp(&self) -> Option<i64> {
        None
    }
}

/// Extension trait with computed properties for OHLCV data
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn body(&self) -> f64 {
        (self.close() - self.open()).abs()
    }

    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    #[inline]
    fn upper_shadow(&self) -> f64 {
        self.high() - self.open().max(self.close())
    }

    #[inline]
    fn lower_shadow(&self) -> f64 {
        self.open().min(self.close()) - self.low()
    }

    /// Close above open
    #[inline]
    fn is_green(&self) -> bool {
        self.close() > self.open()
    }

    /// Close below open
    #[inline]
    fn is_red(&self) -> bool {
        self.close() < self.open()
    }

    /// Validate OHLCV data consistency
    fn validate(&self) -> Result<()> {
        let values = [self.open(), self.high(), self.low(), self.close(), self.volume()];
        if values.iter().any(|v| v.is_nan()) {
            return Err(Error::InvalidCandle {
                index: 0,
                reason: "NaN in OHLCV",
            });
        }
        if values.iter().any(|v| v.is_infinite()) {
            return Err(Error::InvalidCandle {
                index: 0,
                reason: "Infinite value in OHLCV",
            });
        }
        if values.iter().any(|v| *v < 0.0) {
            return Err(Error::InvalidCandle {
                index: 0,
                reason: "negative value in OHLCV",
            });
        }
        if self.high() < self.low() {
            return Err(Error::InvalidCandle {
                index: 0,
                reason: "high < low",
            });
        }
        if self.low() > self.open().min(self.close()) {
            return Err(Error::InvalidCandle {
                index: 0,
                reason: "low above body",
            });
        }
        if self.high() < self.open().max(self.close()) {
            return Err(Error::InvalidCandle {
                index: 0,
                reason: "high below body",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV> OHLCVExt for T {}

// ============================================================
// TESTS
// ============================================================
