//! Per-symbol analysis
//!
//! [`SeriesAnalyzer`] is the pure part: given already-fetched coarse and fine
//! series it runs the sweep detector, the liquidity zone calculator and the
//! plan builder. [`Analyzer`] adds the market-data provider in front of it and
//! folds every failure into [`AnalysisOutcome::Failed`].

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    candle::{Candle, CandleSeries, Interval},
    detectors::{Detection, LiquidityZone, SweepDetector},
    plan::{build_trade_plan, InstrumentProfile, ProfileRegistry, TradePlan},
    provider::MarketDataProvider,
    Error, Result,
};

// ============================================================
// CONFIG
// ============================================================

/// Analysis settings, passed in at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub coarse_interval: Interval,
    pub fine_interval: Interval,
    /// Candles requested per series; providers may return fewer
    pub candle_count: usize,
    /// Trailing coarse candles summarised as the liquidity zone (96 x 15m = 24h)
    pub liquidity_window: usize,
    pub detector: SweepDetector,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            coarse_interval: Interval::FifteenMinutes,
            fine_interval: Interval::FiveMinutes,
            candle_count: 200,
            liquidity_window: 96,
            detector: SweepDetector::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.candle_count == 0 {
            return Err(Error::InvalidConfig("candle_count must be > 0".into()));
        }
        if self.liquidity_window == 0 {
            return Err(Error::InvalidConfig("liquidity_window must be > 0".into()));
        }
        Ok(())
    }
}

// ============================================================
// RESULTS
// ============================================================

/// What happened to the trade plan for one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanStatus {
    /// No sweep signal, so no plan was attempted
    NotApplicable,
    Ready(TradePlan),
    /// Signal fired but the levels failed the ordering check
    Rejected { reason: String },
}

impl PlanStatus {
    pub fn plan(&self) -> Option<&TradePlan> {
        match self {
            PlanStatus::Ready(plan) => Some(plan),
            _ => None,
        }
    }
}

/// Full analysis of one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub symbol: String,
    pub coarse_interval: Interval,
    pub fine_interval: Interval,
    pub detection: Detection,
    pub liquidity: LiquidityZone,
    /// Coarse candles actually used for the liquidity zone
    pub liquidity_candles: usize,
    pub latest_coarse: Candle,
    pub latest_fine: Candle,
    pub plan: PlanStatus,
}

/// Analysis result, or the reason it could not be produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Completed(Analysis),
    Failed { symbol: String, error: String },
}

impl AnalysisOutcome {
    pub fn symbol(&self) -> &str {
        match self {
            AnalysisOutcome::Completed(a) => &a.symbol,
            AnalysisOutcome::Failed { symbol, .. } => symbol,
        }
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        match self {
            AnalysisOutcome::Completed(a) => Some(a),
            AnalysisOutcome::Failed { .. } => None,
        }
    }

    pub fn plan(&self) -> Option<&TradePlan> {
        self.analysis().and_then(|a| a.plan.plan())
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, AnalysisOutcome::Failed { .. })
    }
}

// ============================================================
// SERIES ANALYZER (pure)
// ============================================================

/// Detection, liquidity and plan building over fetched series
#[derive(Debug, Clone)]
pub struct SeriesAnalyzer {
    config: AnalysisConfig,
    profiles: ProfileRegistry,
}

impl SeriesAnalyzer {
    pub fn new(config: AnalysisConfig, profiles: ProfileRegistry) -> Result<Self> {
        config.validate()?;
        profiles.validate()?;
        Ok(Self { config, profiles })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn profile(&self, symbol: &str) -> &InstrumentProfile {
        self.profiles.get(symbol)
    }

    /// Analyze one symbol. Fails with [`Error::InvalidInput`] when either
    /// series is empty; an invalid plan is reported through [`PlanStatus`].
    pub fn evaluate(
        &self,
        symbol: &str,
        coarse: &CandleSeries,
        fine: &CandleSeries,
    ) -> Result<Analysis> {
        let latest_coarse = *coarse
            .last()
            .ok_or(Error::InvalidInput("coarse series is empty"))?;
        let latest_fine = *fine
            .last()
            .ok_or(Error::InvalidInput("fine series is empty"))?;

        let detection = self.config.detector.detect(coarse.candles());
        let window = coarse.tail(self.config.liquidity_window);
        let liquidity = LiquidityZone::from_window(window)?;

        let plan = match detection.signal() {
            None => PlanStatus::NotApplicable,
            Some(signal) => {
                let rationale = format!(
                    "Sweep detected + green confirm on {}",
                    coarse.interval().label()
                );
                match build_trade_plan(signal, self.profiles.get(symbol), rationale) {
                    Ok(plan) => PlanStatus::Ready(plan),
                    Err(e) => PlanStatus::Rejected {
                        reason: e.to_string(),
                    },
                }
            },
        };

        Ok(Analysis {
            symbol: symbol.to_string(),
            coarse_interval: coarse.interval(),
            fine_interval: fine.interval(),
            detection,
            liquidity,
            liquidity_candles: window.len(),
            latest_coarse,
            latest_fine,
            plan,
        })
    }
}

// ============================================================
// PARALLEL EVALUATION
// ============================================================

/// Error from evaluating a single instrument
#[derive(Debug)]
pub struct EvaluationError {
    pub symbol: String,
    pub error: Error,
}

/// Evaluate many pre-fetched instruments in parallel.
///
/// Items are `(symbol, coarse, fine)`; result order follows input order.
pub fn evaluate_parallel<'a, I>(
    analyzer: &SeriesAnalyzer,
    instruments: I,
) -> (Vec<Analysis>, Vec<EvaluationError>)
where
    I: IntoParallelIterator<Item = (&'a str, &'a CandleSeries, &'a CandleSeries)>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, coarse, fine)| {
            analyzer
                .evaluate(symbol, coarse, fine)
                .map_err(|error| EvaluationError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// ANALYZER (fetch + evaluate)
// ============================================================

/// Fetches both series for a symbol and evaluates them
#[derive(Debug)]
pub struct Analyzer<P> {
    provider: P,
    core: SeriesAnalyzer,
}

impl<P: MarketDataProvider> Analyzer<P> {
    pub fn new(provider: P, core: SeriesAnalyzer) -> Self {
        Self { provider, core }
    }

    pub fn builder(provider: P) -> AnalyzerBuilder<P> {
        AnalyzerBuilder::new(provider)
    }

    pub fn core(&self) -> &SeriesAnalyzer {
        &self.core
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Never fails: fetch and input errors come back as [`AnalysisOutcome::Failed`].
    pub async fn analyze(&self, symbol: &str) -> AnalysisOutcome {
        match self.try_analyze(symbol).await {
            Ok(analysis) => {
                match &analysis.plan {
                    PlanStatus::Ready(plan) => info!(
                        %symbol,
                        entry = plan.entry,
                        stop_loss = plan.stop_loss,
                        take_profit = plan.take_profit,
                        "sweep signal with trade plan"
                    ),
                    PlanStatus::Rejected { reason } => {
                        warn!(%symbol, %reason, "sweep signal but no valid plan")
                    },
                    PlanStatus::NotApplicable => debug!(
                        %symbol,
                        reason = analysis.detection.reason().map(|r| r.as_str()),
                        "no sweep signal"
                    ),
                }
                AnalysisOutcome::Completed(analysis)
            },
            Err(error) => {
                warn!(%symbol, %error, "analysis failed");
                AnalysisOutcome::Failed {
                    symbol: symbol.to_string(),
                    error: error.to_string(),
                }
            },
        }
    }

    async fn try_analyze(&self, symbol: &str) -> Result<Analysis> {
        let config = self.core.config();
        let coarse = self
            .provider
            .fetch_series(symbol, config.coarse_interval, config.candle_count)
            .await?;
        let fine = self
            .provider
            .fetch_series(symbol, config.fine_interval, config.candle_count)
            .await?;
        self.core.evaluate(symbol, &coarse, &fine)
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for [`Analyzer`]; validates everything in `build`
pub struct AnalyzerBuilder<P> {
    provider: P,
    config: AnalysisConfig,
    profiles: ProfileRegistry,
}

impl<P: MarketDataProvider> AnalyzerBuilder<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            config: AnalysisConfig::default(),
            profiles: ProfileRegistry::default(),
        }
    }

    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn detector(mut self, detector: SweepDetector) -> Self {
        self.config.detector = detector;
        self
    }

    pub fn profiles(mut self, profiles: ProfileRegistry) -> Self {
        self.profiles = profiles;
        self
    }

    /// Register or replace one symbol's profile
    pub fn profile(mut self, symbol: impl Into<String>, profile: InstrumentProfile) -> Self {
        self.profiles.insert(symbol, profile);
        self
    }

    pub fn build(self) -> Result<Analyzer<P>> {
        let core = SeriesAnalyzer::new(self.config, self.profiles)?;
        Ok(Analyzer::new(self.provider, core))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::NoSignalReason;
    use chrono::{Duration, TimeZone, Utc};

    fn series(interval: Interval, ohlc: &[(f64, f64, f64, f64)]) -> CandleSeries {
        let start = Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap();
        let step = Duration::minutes(interval.minutes() as i64);
        let candles = ohlc
            .iter()
            .enumerate()
            .map(|(i, &(o, h, l, c))| Candle::new(start + step * i as i32, o, h, l, c, 0.0))
            .collect();
        CandleSeries::new("XAU/USD", interval, candles).unwrap()
    }

    fn flat(interval: Interval, n: usize) -> CandleSeries {
        series(interval, &vec![(100.0, 101.0, 99.0, 100.5); n])
    }

    fn analyzer() -> SeriesAnalyzer {
        SeriesAnalyzer::new(AnalysisConfig::default(), ProfileRegistry::default()).unwrap()
    }

    #[test]
    fn test_empty_series_is_invalid_input() {
        let empty = flat(Interval::FifteenMinutes, 0);
        let fine = flat(Interval::FiveMinutes, 3);
        let err = analyzer().evaluate("XAU/USD", &empty, &fine).unwrap_err();
        assert_eq!(err, Error::InvalidInput("coarse series is empty"));

        let coarse = flat(Interval::FifteenMinutes, 3);
        let empty = flat(Interval::FiveMinutes, 0);
        let err = analyzer().evaluate("XAU/USD", &coarse, &empty).unwrap_err();
        assert_eq!(err, Error::InvalidInput("fine series is empty"));
    }

    #[test]
    fn test_short_series_reports_insufficient_data() {
        let coarse = flat(Interval::FifteenMinutes, 3);
        let fine = flat(Interval::FiveMinutes, 3);
        let analysis = analyzer().evaluate("XAU/USD", &coarse, &fine).unwrap();
        assert_eq!(
            analysis.detection.reason(),
            Some(NoSignalReason::InsufficientData)
        );
        assert_eq!(analysis.plan, PlanStatus::NotApplicable);
        assert_eq!(analysis.liquidity_candles, 3);
    }

    #[test]
    fn test_liquidity_uses_trailing_window() {
        let mut ohlc = vec![(50.0, 200.0, 10.0, 60.0)];
        ohlc.extend(vec![(100.0, 101.0, 99.0, 100.5); 96]);
        let coarse = series(Interval::FifteenMinutes, &ohlc);
        let fine = flat(Interval::FiveMinutes, 1);

        let analysis = analyzer().evaluate("XAU/USD", &coarse, &fine).unwrap();
        assert_eq!(analysis.liquidity_candles, 96);
        assert_eq!(analysis.liquidity.recent_low, 99.0);
        assert_eq!(analysis.liquidity.recent_high, 101.0);
    }

    #[test]
    fn test_config_validation() {
        let config = AnalysisConfig {
            liquidity_window: 0,
            ..AnalysisConfig::default()
        };
        assert!(SeriesAnalyzer::new(config, ProfileRegistry::default()).is_err());
    }

    #[test]
    fn test_parallel_evaluation_splits_errors() {
        let coarse = flat(Interval::FifteenMinutes, 10);
        let fine = flat(Interval::FiveMinutes, 10);
        let empty = flat(Interval::FiveMinutes, 0);

        let instruments = vec![
            ("XAU/USD", &coarse, &fine),
            ("BTC/USD", &coarse, &empty),
            ("ETH/USD", &coarse, &fine),
        ];
        let (results, errors) = evaluate_parallel(&analyzer(), instruments);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].symbol, "XAU/USD");
        assert_eq!(results[1].symbol, "ETH/USD");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].symbol, "BTC/USD");
    }
}
