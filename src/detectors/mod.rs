//! Candle pattern detectors
//!
//! # Detectors
//!
//! - **Sweep**: local-minimum candle with a long rejection wick, confirmed by
//!   the next candle closing green. Drives the trade plan.
//! - **Engulfing**: two-candle bullish engulfing check, available on its own.
//! - **Liquidity**: recent low/high/close summary of a window.

pub mod helpers;

pub mod engulfing;
pub mod liquidity;
pub mod sweep;

// Re-export all detectors for convenience
pub use engulfing::*;
pub use helpers::*;
pub use liquidity::*;
pub use sweep::*;
