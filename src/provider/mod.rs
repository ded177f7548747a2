//! Market data providers

pub mod twelvedata;

use async_trait::async_trait;

use crate::{
    candle::{CandleSeries, Interval},
    Result,
};

pub use twelvedata::TwelveDataClient;

/// Source of recent candles for a symbol
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Up to `count` most recent candles, oldest first.
    ///
    /// Transport and API failures, including "no data" responses, are
    /// reported as [`crate::Error::DataFetch`].
    async fn fetch_series(&self, symbol: &str, interval: Interval, count: usize)
        -> Result<CandleSeries>;
}

#[async_trait]
impl<P: MarketDataProvider + ?Sized> MarketDataProvider for std::sync::Arc<P> {
    async fn fetch_series(
        &self,
        symbol: &str,
        interval: Interval,
        count: usize,
    ) -> Result<CandleSeries> {
        (**self).fetch_series(symbol, interval, count).await
    }
}
