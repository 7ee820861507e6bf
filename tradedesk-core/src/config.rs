/// Terminal configuration
///
/// Defaults suit a local demo; every field can be overridden through the environment
/// (see [`TerminalConfig::from_env`]) or the `with_*` builders.
use crate::{
    error::TerminalError,
    expiry::{DEFAULT_CUTOFF_OFFSET, DEFAULT_ROUND_DURATION, ExpiryConfig},
    order_entry::{DEFAULT_FEE_RATE, DEFAULT_MAX_LEVERAGE, OrderEntryConfig},
    synth::{DEFAULT_BOOK_DEPTH, OrderBookSynthesizer},
};
use std::{str::FromStr, time::Duration};
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct TerminalConfig {
    /// Public 24h ticker endpoint base URL
    pub ticker_base_url: String,
    /// Authenticated asset/transaction backend base URL
    pub backend_base_url: String,
    /// Bearer token for the backend
    pub api_token: Option<String>,
    /// Where callers redirect when the backend session expires
    pub login_path: String,
    /// Chart regeneration interval
    pub series_refresh: Duration,
    /// Order book and trade tape regeneration interval
    pub book_refresh: Duration,
    /// Ticker polling interval
    pub ticker_poll: Duration,
    /// HTTP request timeout
    pub request_timeout: Duration,
    pub book_depth: usize,
    pub trade_tape_len: usize,
    pub round_duration: Duration,
    pub cutoff_offset: Duration,
    pub fee_rate: f64,
    pub max_leverage: u32,
    /// Balance order-entry forms start from before the backend answers
    pub trading_balance: f64,
    /// Profit per unit staked on a winning binary contract
    pub binary_payout_ratio: f64,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            ticker_base_url: "https://api.binance.com".to_string(),
            backend_base_url: "http://127.0.0.1:8080".to_string(),
            api_token: None,
            login_path: "/login".to_string(),
            series_refresh: Duration::from_secs(5),
            book_refresh: Duration::from_secs(2),
            ticker_poll: Duration::from_secs(10),
            request_timeout: Duration::from_secs(10),
            book_depth: DEFAULT_BOOK_DEPTH,
            trade_tape_len: 20,
            round_duration: DEFAULT_ROUND_DURATION,
            cutoff_offset: DEFAULT_CUTOFF_OFFSET,
            fee_rate: DEFAULT_FEE_RATE,
            max_leverage: DEFAULT_MAX_LEVERAGE,
            trading_balance: 10_000.0,
            binary_payout_ratio: 0.85,
        }
    }
}

impl TerminalConfig {
    /// Build a configuration from environment variables, falling back to defaults
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ticker_base_url: env_string("TICKER_BASE_URL").unwrap_or(defaults.ticker_base_url),
            backend_base_url: env_string("BACKEND_BASE_URL").unwrap_or(defaults.backend_base_url),
            api_token: env_string("API_TOKEN"),
            login_path: env_string("LOGIN_PATH").unwrap_or(defaults.login_path),
            series_refresh: env_secs("SERIES_REFRESH_SECS").unwrap_or(defaults.series_refresh),
            book_refresh: env_secs("BOOK_REFRESH_SECS").unwrap_or(defaults.book_refresh),
            ticker_poll: env_secs("TICKER_POLL_SECS").unwrap_or(defaults.ticker_poll),
            request_timeout: env_secs("REQUEST_TIMEOUT_SECS").unwrap_or(defaults.request_timeout),
            book_depth: env_parse("BOOK_DEPTH").unwrap_or(defaults.book_depth),
            trade_tape_len: env_parse("TRADE_TAPE_LEN").unwrap_or(defaults.trade_tape_len),
            round_duration: env_secs("ROUND_SECS").unwrap_or(defaults.round_duration),
            cutoff_offset: env_secs("CUTOFF_SECS").unwrap_or(defaults.cutoff_offset),
            fee_rate: env_parse("FEE_RATE").unwrap_or(defaults.fee_rate),
            max_leverage: env_parse("MAX_LEVERAGE").unwrap_or(defaults.max_leverage),
            trading_balance: env_parse("TRADING_BALANCE").unwrap_or(defaults.trading_balance),
            binary_payout_ratio: env_parse("BINARY_PAYOUT_RATIO")
                .unwrap_or(defaults.binary_payout_ratio),
        }
    }

    pub fn with_ticker_base_url(mut self, url: impl Into<String>) -> Self {
        self.ticker_base_url = url.into();
        self
    }

    pub fn with_backend(mut self, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        self.backend_base_url = base_url.into();
        self.api_token = Some(token.into());
        self
    }

    pub fn with_refresh(mut self, series: Duration, book: Duration) -> Self {
        self.series_refresh = series;
        self.book_refresh = book;
        self
    }

    pub fn with_ticker_poll(mut self, interval: Duration) -> Self {
        self.ticker_poll = interval;
        self
    }

    pub fn with_book_depth(mut self, depth: usize) -> Self {
        self.book_depth = depth;
        self
    }

    pub fn with_round(mut self, duration: Duration, cutoff: Duration) -> Self {
        self.round_duration = duration;
        self.cutoff_offset = cutoff;
        self
    }

    pub fn with_trading_balance(mut self, balance: f64) -> Self {
        self.trading_balance = balance;
        self
    }

    pub fn order_entry(&self) -> OrderEntryConfig {
        OrderEntryConfig {
            fee_rate: self.fee_rate,
            max_leverage: self.max_leverage,
        }
    }

    pub fn expiry(&self) -> Result<ExpiryConfig, TerminalError> {
        ExpiryConfig::new(self.round_duration, self.cutoff_offset)
    }

    pub fn book_synthesizer(&self) -> Result<OrderBookSynthesizer, TerminalError> {
        OrderBookSynthesizer::new(self.book_depth)
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = env_string(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid {}={}, using default", key, raw);
            None
        }
    }
}

fn env_secs(key: &str) -> Option<Duration> {
    env_parse::<u64>(key)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}
