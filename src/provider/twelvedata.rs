//! TwelveData `time_series` adapter.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, warn};

use super::MarketDataProvider;
use crate::{
    candle::{Candle, CandleSeries, Interval},
    Error, Result,
};

pub const DEFAULT_BASE_URL: &str = "https://api.twelvedata.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(12);

/// HTTP client for the TwelveData REST API
#[derive(Clone)]
pub struct TwelveDataClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TwelveDataClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl fmt::Debug for TwelveDataClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwelveDataClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MarketDataProvider for TwelveDataClient {
    async fn fetch_series(
        &self,
        symbol: &str,
        interval: Interval,
        count: usize,
    ) -> Result<CandleSeries> {
        let url = format!("{}/time_series", self.base_url);
        let outputsize = count.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", interval.as_str()),
                ("outputsize", outputsize.as_str()),
                ("format", "JSON"),
                ("timezone", "UTC"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            // the request URL carries the api key
            .map_err(|e| Error::DataFetch(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::DataFetch(e.without_url().to_string()))?;

        if !status.is_success() {
            warn!(%symbol, %interval, %status, "TwelveData request failed");
            return Err(status_error(status, &body));
        }

        let candles = parse_time_series(&body)?;
        debug!(%symbol, %interval, candles = candles.len(), "fetched series");
        CandleSeries::new(symbol, interval, candles)
    }
}

/// Error for a non-2xx `time_series` response
fn status_error(status: reqwest::StatusCode, body: &str) -> Error {
    Error::DataFetch(format!("HTTP {status}: {body}"))
}

// ============================================================
// RESPONSE PARSING
// ============================================================

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    values: Option<Vec<RawValue>>,
    status: Option<String>,
    code: Option<i64>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    datetime: String,
    open: String,
    high: String,
    low: String,
    close: String,
    volume: Option<String>,
}

/// Decode a `time_series` body into candles, oldest first.
///
/// TwelveData lists values newest-first and encodes numbers as strings.
/// Bodies without `values` are provider errors.
pub fn parse_time_series(body: &str) -> Result<Vec<Candle>> {
    let response: TimeSeriesResponse = serde_json::from_str(body)
        .map_err(|e| Error::DataFetch(format!("invalid TwelveData response: {e}")))?;

    let Some(values) = response.values else {
        let detail = match (response.code, response.message) {
            (Some(code), Some(message)) => format!("{code} {message}"),
            (None, Some(message)) => message,
            _ => body.to_string(),
        };
        let status = response.status.unwrap_or_else(|| "missing values".to_string());
        return Err(Error::DataFetch(format!(
            "TwelveData error or invalid response ({status}): {detail}"
        )));
    };

    values.iter().rev().map(to_candle).collect()
}

fn to_candle(raw: &RawValue) -> Result<Candle> {
    let volume = match raw.volume.as_deref() {
        None | Some("") => 0.0,
        Some(v) => parse_price("volume", v)?,
    };
    Ok(Candle::new(
        parse_datetime(&raw.datetime)?.and_utc(),
        parse_price("open", &raw.open)?,
        parse_price("high", &raw.high)?,
        parse_price("low", &raw.low)?,
        parse_price("close", &raw.close)?,
        volume,
    ))
}

fn parse_price(field: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::DataFetch(format!("invalid {field} value {value:?}")))
}

fn parse_datetime(value: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }
    // daily bars carry a bare date
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| Error::DataFetch(format!("invalid datetime {value:?}")))
}
