//! Trade plan construction
//!
//! A plan is derived from a sweep signal and an [`InstrumentProfile`]. The
//! profile carries every instrument-specific constant (stop distance, entry
//! buffer, rounding precision, confidence, risk-reward), and a
//! [`ProfileRegistry`] maps symbols to profiles.

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{detectors::SweepSignal, Error, Ratio, Result, OHLCV};

// ============================================================
// SIDE
// ============================================================

/// Trade direction. Only bullish sweep reversals are modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "LONG")]
    Long,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Long => "LONG",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================
// INSTRUMENT PROFILE
// ============================================================

/// Instrument-specific constants used by the plan builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentProfile {
    /// Price distance below the sweep low for the stop
    pub stop_distance: f64,
    /// Added to the confirming candle's open for the minimum entry
    pub entry_buffer: f64,
    /// Decimal places kept on every price
    pub precision: u32,
    /// Fixed score reported with the plan; not estimated from data
    pub confidence: Ratio,
    /// Take-profit distance as a multiple of risk
    pub risk_reward: f64,
}

impl InstrumentProfile {
    pub const GOLD_PIP: f64 = 0.01;
    pub const GOLD_STOP_PIPS: f64 = 20.0;
    pub const DEFAULT_RISK_REWARD: f64 = 4.0;

    /// Gold: 20 pips of 0.01, 0.02 buffer, 3 decimals, 80%
    pub fn gold() -> Self {
        Self {
            stop_distance: Self::GOLD_STOP_PIPS * Self::GOLD_PIP,
            entry_buffer: 0.02,
            precision: 3,
            confidence: Ratio::new_const(0.80),
            risk_reward: Self::DEFAULT_RISK_REWARD,
        }
    }

    /// Crypto: flat 350 stop, 1.0 buffer, 2 decimals, 75%
    pub fn crypto() -> Self {
        Self {
            stop_distance: 350.0,
            entry_buffer: 1.0,
            precision: 2,
            confidence: Ratio::new_const(0.75),
            risk_reward: Self::DEFAULT_RISK_REWARD,
        }
    }

    pub fn with_risk_reward(mut self, risk_reward: f64) -> Self {
        self.risk_reward = risk_reward;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.stop_distance.is_finite() || self.stop_distance <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "stop_distance must be positive, got {}",
                self.stop_distance
            )));
        }
        if !self.entry_buffer.is_finite() || self.entry_buffer < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "entry_buffer must be non-negative, got {}",
                self.entry_buffer
            )));
        }
        if !self.risk_reward.is_finite() || self.risk_reward <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "risk_reward must be positive, got {}",
                self.risk_reward
            )));
        }
        if self.precision > 10 {
            return Err(Error::OutOfRange {
                field: "precision",
                value: self.precision as f64,
                min: 0.0,
                max: 10.0,
            });
        }
        Ok(())
    }

    /// Round a price to this profile's precision, ties to even
    #[inline]
    pub fn round(&self, price: f64) -> f64 {
        let scale = 10f64.powi(self.precision as i32);
        (price * scale).round_ties_even() / scale
    }
}

// ============================================================
// PROFILE REGISTRY
// ============================================================

pub const GOLD_SYMBOL: &str = "XAU/USD";
pub const BITCOIN_SYMBOL: &str = "BTC/USD";

/// Symbol -> profile lookup with a fallback for unlisted symbols
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRegistry {
    profiles: HashMap<String, InstrumentProfile>,
    fallback: InstrumentProfile,
}

impl Default for ProfileRegistry {
    /// Gold and bitcoin listed; everything else priced like crypto.
    fn default() -> Self {
        Self::new(InstrumentProfile::crypto())
            .with(GOLD_SYMBOL, InstrumentProfile::gold())
            .with(BITCOIN_SYMBOL, InstrumentProfile::crypto())
    }
}

impl ProfileRegistry {
    pub fn new(fallback: InstrumentProfile) -> Self {
        Self {
            profiles: HashMap::new(),
            fallback,
        }
    }

    /// Register or replace the profile for `symbol`
    pub fn with(mut self, symbol: impl Into<String>, profile: InstrumentProfile) -> Self {
        self.profiles.insert(symbol.into(), profile);
        self
    }

    pub fn insert(&mut self, symbol: impl Into<String>, profile: InstrumentProfile) {
        self.profiles.insert(symbol.into(), profile);
    }

    /// Apply one risk-reward multiple to every profile, fallback included
    pub fn with_risk_reward(mut self, risk_reward: f64) -> Self {
        for profile in self.profiles.values_mut() {
            profile.risk_reward = risk_reward;
        }
        self.fallback.risk_reward = risk_reward;
        self
    }

    pub fn get(&self, symbol: &str) -> &InstrumentProfile {
        self.profiles.get(symbol).unwrap_or(&self.fallback)
    }

    /// Whether `symbol` has its own profile rather than the fallback
    pub fn contains(&self, symbol: &str) -> bool {
        self.profiles.contains_key(symbol)
    }

    pub fn fallback(&self) -> &InstrumentProfile {
        &self.fallback
    }

    pub fn validate(&self) -> Result<()> {
        self.fallback.validate()?;
        for profile in self.profiles.values() {
            profile.validate()?;
        }
        Ok(())
    }
}

// ============================================================
// TRADE PLAN
// ============================================================

/// Entry, stop and targets for a detected sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePlan {
    pub side: Side,
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// First partial target at 1:1
    pub tp1: f64,
    pub confidence: f64,
    pub rationale: String,
}

impl TradePlan {
    /// Distance from entry to stop
    #[inline]
    pub fn risk(&self) -> f64 {
        self.entry - self.stop_loss
    }

    /// Distance from entry to the final target
    #[inline]
    pub fn reward(&self) -> f64 {
        self.take_profit - self.entry
    }
}

/// Build a LONG plan from a sweep signal.
///
/// Entry is the larger of the confirming open plus the profile buffer and
/// the midpoint between the confirming close and the sweep low. Fails with
/// [`Error::InvalidPlan`] unless `stop_loss < entry < take_profit` holds,
/// both before and after rounding.
pub fn build_trade_plan<T: OHLCV>(
    signal: &SweepSignal<T>,
    profile: &InstrumentProfile,
    rationale: impl Into<String>,
) -> Result<TradePlan> {
    let sweep_low = signal.sweep.low();
    let stop_loss = sweep_low - profile.stop_distance;
    let entry = (signal.confirm.open() + profile.entry_buffer)
        .max((signal.confirm.close() + sweep_low) / 2.0);
    let risk = entry - stop_loss;
    let take_profit = entry + risk * profile.risk_reward;
    let tp1 = entry + risk;

    check_ordering(stop_loss, entry, take_profit)?;

    let plan = TradePlan {
        side: Side::Long,
        entry: profile.round(entry),
        stop_loss: profile.round(stop_loss),
        take_profit: profile.round(take_profit),
        tp1: profile.round(tp1),
        confidence: profile.confidence.get(),
        rationale: rationale.into(),
    };
    check_ordering(plan.stop_loss, plan.entry, plan.take_profit)?;
    Ok(plan)
}

fn check_ordering(stop_loss: f64, entry: f64, take_profit: f64) -> Result<()> {
    // NaN fails every comparison, so it is rejected here too
    if stop_loss < entry && entry < take_profit {
        Ok(())
    } else {
        Err(Error::InvalidPlan {
            entry,
            stop_loss,
            take_profit,
        })
    }
}
