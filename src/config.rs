//! Environment configuration
//!
//! Everything is read once at startup into a [`Config`] that is passed to the
//! components explicitly. `.env` files are honoured through `dotenv`.

use std::{collections::HashMap, fmt, str::FromStr};

use chrono::NaiveTime;
use chrono_tz::Tz;
use tracing::warn;

use crate::{
    analysis::AnalysisConfig,
    candle::Interval,
    detectors::{SweepDetector, DEFAULT_LOOKBACK, DEFAULT_MIN_WICK_RATIO},
    notify::TelegramNotifier,
    params::ParameterizedDetector,
    plan::{InstrumentProfile, ProfileRegistry, BITCOIN_SYMBOL, GOLD_SYMBOL},
    provider::TwelveDataClient,
    schedule::SessionSchedule,
    Error, Result,
};

pub const DEFAULT_SYMBOLS: [&str; 2] = [GOLD_SYMBOL, BITCOIN_SYMBOL];

#[derive(Clone)]
pub struct Config {
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub twelvedata_api_key: Option<String>,
    pub twelvedata_base_url: Option<String>,
    pub telegram_api_base: Option<String>,
    pub symbols: Vec<String>,
    pub schedule: SessionSchedule,
    pub analysis: AnalysisConfig,
    pub risk_reward: f64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Config")
            .field("telegram_bot_token", &redact(&self.telegram_bot_token))
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("twelvedata_api_key", &redact(&self.twelvedata_api_key))
            .field("twelvedata_base_url", &self.twelvedata_base_url)
            .field("telegram_api_base", &self.telegram_api_base)
            .field("symbols", &self.symbols)
            .field("schedule", &self.schedule)
            .field("analysis", &self.analysis)
            .field("risk_reward", &self.risk_reward)
            .finish()
    }
}

impl Config {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let symbols: Vec<String> = match get("ALERT_SYMBOLS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        };
        if symbols.is_empty() {
            return Err(Error::InvalidConfig("ALERT_SYMBOLS lists no symbols".into()));
        }

        let defaults = SessionSchedule::default();
        let schedule = SessionSchedule {
            name: get("SESSION_NAME").unwrap_or(defaults.name),
            timezone: match get("SESSION_TIMEZONE") {
                Some(raw) => raw
                    .parse::<Tz>()
                    .map_err(|_| invalid("SESSION_TIMEZONE", &raw))?,
                None => defaults.timezone,
            },
            start: match get("SESSION_START") {
                Some(raw) => parse_time(&raw).ok_or_else(|| invalid("SESSION_START", &raw))?,
                None => defaults.start,
            },
            pre_alert_minutes: parse_or(&get, "PRE_ALERT_MINUTES", defaults.pre_alert_minutes)?,
            post_alert_minutes: parse_or(&get, "POST_ALERT_MINUTES", defaults.post_alert_minutes)?,
            weekdays_only: match get("WEEKDAYS_ONLY") {
                Some(raw) => parse_bool(&raw).ok_or_else(|| invalid("WEEKDAYS_ONLY", &raw))?,
                None => defaults.weekdays_only,
            },
        };
        schedule.validate()?;

        let mut params: HashMap<&str, f64> = HashMap::new();
        params.insert(
            "lookback",
            parse_or(&get, "SWEEP_LOOKBACK", DEFAULT_LOOKBACK as f64)?,
        );
        params.insert(
            "min_wick_ratio",
            parse_or(&get, "SWEEP_WICK_RATIO", DEFAULT_MIN_WICK_RATIO)?,
        );
        let detector = SweepDetector::with_params(&params)?;

        let base = AnalysisConfig::default();
        let analysis = AnalysisConfig {
            coarse_interval: parse_or::<Interval, _>(&get, "COARSE_INTERVAL", base.coarse_interval)?,
            fine_interval: parse_or::<Interval, _>(&get, "FINE_INTERVAL", base.fine_interval)?,
            candle_count: parse_or(&get, "CANDLE_COUNT", base.candle_count)?,
            liquidity_window: parse_or(&get, "LIQUIDITY_WINDOW", base.liquidity_window)?,
            detector,
        };
        analysis.validate()?;

        let config = Self {
            telegram_bot_token: get("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: get("TELEGRAM_CHAT_ID"),
            twelvedata_api_key: get("TWELVEDATA_API_KEY"),
            twelvedata_base_url: get("TWELVEDATA_BASE_URL"),
            telegram_api_base: get("TELEGRAM_API_BASE"),
            symbols,
            schedule,
            analysis,
            risk_reward: parse_or(&get, "RISK_REWARD", InstrumentProfile::DEFAULT_RISK_REWARD)?,
        };
        config.profiles().validate()?;
        for symbol in config.unlisted_symbols() {
            warn!(%symbol, "no instrument profile for symbol, using the fallback profile");
        }
        Ok(config)
    }

    /// Configured symbols without their own profile
    pub fn unlisted_symbols(&self) -> Vec<&str> {
        let profiles = self.profiles();
        self.symbols
            .iter()
            .map(String::as_str)
            .filter(|symbol| !profiles.contains(symbol))
            .collect()
    }

    /// Built-in profiles with the configured risk-reward multiple
    pub fn profiles(&self) -> ProfileRegistry {
        ProfileRegistry::default().with_risk_reward(self.risk_reward)
    }

    /// Bot token and chat id, both required to send anything
    pub fn require_telegram(&self) -> Result<(&str, &str)> {
        match (&self.telegram_bot_token, &self.telegram_chat_id) {
            (Some(token), Some(chat)) => Ok((token.as_str(), chat.as_str())),
            _ => Err(Error::InvalidConfig(
                "TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must be set".into(),
            )),
        }
    }

    pub fn require_twelvedata(&self) -> Result<&str> {
        self.twelvedata_api_key
            .as_deref()
            .ok_or_else(|| Error::InvalidConfig("TWELVEDATA_API_KEY must be set".into()))
    }

    pub fn twelvedata_client(&self) -> Result<TwelveDataClient> {
        let api_key = self.require_twelvedata()?;
        match &self.twelvedata_base_url {
            Some(base) => TwelveDataClient::with_base_url(api_key, base.as_str()),
            None => TwelveDataClient::new(api_key),
        }
    }

    pub fn telegram_notifier(&self) -> Result<TelegramNotifier> {
        let (token, chat) = self.require_telegram()?;
        match &self.telegram_api_base {
            Some(base) => TelegramNotifier::with_api_base(token, chat, base.as_str()),
            None => TelegramNotifier::new(token, chat),
        }
    }
}

// ============================================================
// VALUE PARSING
// ============================================================

fn invalid(key: &str, raw: &str) -> Error {
    Error::InvalidConfig(format!("{key}: invalid value {raw:?}"))
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.parse().map_err(|_| invalid(key, &raw)),
        None => Ok(default),
    }
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
