//! 24h ticker polling with a synthetic fallback
//!
//! Live figures come from a Binance-style public REST endpoint. Any failure degrades to a
//! ticker derived from the instrument seed; feed errors are logged and never surfaced.

use crate::{
    catalog::{InstrumentInfo, InstrumentSeed, round_to},
    error::TerminalError,
    schedule::RefreshHandle,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use tokio::{sync::mpsc, time::MissedTickBehavior};
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum TickerOrigin {
    Live,
    Fallback,
}

/// Rolling 24h statistics for one instrument
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Ticker24h {
    /// Catalog symbol (eg/ "BTC/USDT"), not the exchange ticker symbol
    pub symbol: String,
    pub last_price: f64,
    pub change_percent: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub origin: TickerOrigin,
    pub received_at: DateTime<Utc>,
}

impl Ticker24h {
    /// Synthetic ticker consistent with the charts generated from `seed`.
    pub fn fallback(seed: &InstrumentSeed) -> Self {
        let last_price = seed.last_price();
        let profile = seed.profile();
        let swing = last_price * profile.noise_fraction;
        let volume = (profile.volume.start + profile.volume.end) / 2;

        Self {
            symbol: seed.symbol.clone(),
            last_price,
            change_percent: seed.change_percent,
            high: round_to(last_price + swing, seed.decimal_places),
            low: round_to((last_price - swing).max(seed.price_unit()), seed.decimal_places),
            volume: volume as f64,
            origin: TickerOrigin::Fallback,
            received_at: Utc::now(),
        }
    }

    pub fn is_live(&self) -> bool {
        self.origin == TickerOrigin::Live
    }
}

/// Source of live 24h tickers, keyed by exchange ticker symbol (eg/ "BTCUSDT")
#[async_trait]
pub trait TickerSource: Send + Sync {
    async fn fetch(&self, ticker_symbol: &str) -> Result<Ticker24h, TerminalError>;
}

/// Binance `GET /api/v3/ticker/24hr` response. Prices arrive as decimal strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinanceTicker24h {
    symbol: String,
    #[serde(with = "rust_decimal::serde::str")]
    last_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    price_change_percent: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    high_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    low_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    volume: Decimal,
}

impl TryFrom<BinanceTicker24h> for Ticker24h {
    type Error = TerminalError;

    fn try_from(wire: BinanceTicker24h) -> Result<Self, Self::Error> {
        let to_f64 = |field: &'static str, value: Decimal| {
            value.to_f64().ok_or_else(|| {
                TerminalError::UpstreamUnavailable(format!(
                    "ticker {} field {field} out of range: {value}",
                    wire.symbol
                ))
            })
        };

        Ok(Self {
            last_price: to_f64("lastPrice", wire.last_price)?,
            change_percent: to_f64("priceChangePercent", wire.price_change_percent)?,
            high: to_f64("highPrice", wire.high_price)?,
            low: to_f64("lowPrice", wire.low_price)?,
            volume: to_f64("volume", wire.volume)?,
            symbol: wire.symbol.clone(),
            origin: TickerOrigin::Live,
            received_at: Utc::now(),
        })
    }
}

/// [`TickerSource`] backed by a public REST endpoint
#[derive(Debug, Clone)]
pub struct HttpTickerSource {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpTickerSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TerminalError> {
        let endpoint = Url::parse(base_url)?.join("/api/v3/ticker/24hr")?;
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            timeout,
        })
    }

    fn url_for(&self, ticker_symbol: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("symbol", ticker_symbol);
        url
    }
}

#[async_trait]
impl TickerSource for HttpTickerSource {
    async fn fetch(&self, ticker_symbol: &str) -> Result<Ticker24h, TerminalError> {
        let response = self
            .client
            .get(self.url_for(ticker_symbol))
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TerminalError::UpstreamUnavailable(format!(
                "ticker {ticker_symbol} returned HTTP {}",
                response.status()
            )));
        }

        let wire: BinanceTicker24h = response.json().await?;
        Ticker24h::try_from(wire)
    }
}

/// Polls a [`TickerSource`], substituting [`Ticker24h::fallback`] on any failure
#[derive(Clone)]
pub struct TickerFeed {
    source: Arc<dyn TickerSource>,
}

impl std::fmt::Debug for TickerFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickerFeed").finish_non_exhaustive()
    }
}

impl TickerFeed {
    pub fn new(source: Arc<dyn TickerSource>) -> Self {
        Self { source }
    }

    /// Current ticker for `instrument`. Never fails.
    pub async fn poll(&self, instrument: &InstrumentInfo) -> Ticker24h {
        let Some(ticker_symbol) = instrument.ticker_symbol else {
            debug!(symbol = instrument.symbol, "no live ticker, using fallback");
            return Ticker24h::fallback(&instrument.seed());
        };

        match self.source.fetch(ticker_symbol).await {
            Ok(ticker) => Ticker24h {
                symbol: instrument.symbol.to_string(),
                ..ticker
            },
            Err(error) => {
                warn!(
                    symbol = instrument.symbol,
                    %error,
                    "ticker fetch failed, using fallback"
                );
                Ticker24h::fallback(&instrument.seed())
            }
        }
    }

    /// Poll `instrument` now and then every `interval`, sending each ticker to `tx`.
    ///
    /// The task ends when the receiver is dropped or the returned handle is cancelled.
    pub fn spawn_polling(
        &self,
        instrument: InstrumentInfo,
        interval: Duration,
        tx: mpsc::Sender<Ticker24h>,
    ) -> RefreshHandle {
        let feed = self.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let update = feed.poll(&instrument).await;
                if tx.send(update).await.is_err() {
                    debug!(symbol = instrument.symbol, "ticker receiver dropped");
                    break;
                }
            }
        });

        RefreshHandle::from_task("ticker", task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InstrumentCatalog;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TickerSource for FailingSource {
        async fn fetch(&self, ticker_symbol: &str) -> Result<Ticker24h, TerminalError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(TerminalError::UpstreamUnavailable(format!("{ticker_symbol} offline")))
        }
    }

    struct StaticSource;

    #[async_trait]
    impl TickerSource for StaticSource {
        async fn fetch(&self, ticker_symbol: &str) -> Result<Ticker24h, TerminalError> {
            Ok(Ticker24h {
                symbol: ticker_symbol.to_string(),
                last_price: 70_000.0,
                change_percent: 4.0,
                high: 71_000.0,
                low: 66_000.0,
                volume: 12_345.0,
                origin: TickerOrigin::Live,
                received_at: Utc::now(),
            })
        }
    }

    #[test]
    fn test_binance_ticker_deserialises() {
        let input = r#"{
            "symbol": "BTCUSDT",
            "priceChange": "-94.99999800",
            "priceChangePercent": "-0.095",
            "lastPrice": "67250.10000000",
            "highPrice": "68100.00000000",
            "lowPrice": "66020.55000000",
            "volume": "18342.58610000",
            "count": 1024
        }"#;

        let wire: BinanceTicker24h = serde_json::from_str(input).unwrap();
        let ticker = Ticker24h::try_from(wire).unwrap();

        assert_eq!(ticker.symbol, "BTCUSDT");
        for (actual, expected) in [
            (ticker.last_price, 67_250.1),
            (ticker.change_percent, -0.095),
            (ticker.high, 68_100.0),
            (ticker.low, 66_020.55),
            (ticker.volume, 18_342.5861),
        ] {
            assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
        }
        assert!(ticker.is_live());
    }

    #[test]
    fn test_http_source_url() {
        let source = HttpTickerSource::new("https://api.binance.com", Duration::from_secs(5)).unwrap();
        assert_eq!(
            source.url_for("ETHUSDT").as_str(),
            "https://api.binance.com/api/v3/ticker/24hr?symbol=ETHUSDT"
        );

        assert!(matches!(
            HttpTickerSource::new("not a url", Duration::from_secs(5)),
            Err(TerminalError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_fallback_matches_seed() {
        let seed = InstrumentCatalog::global().seed("BTC/USDT").unwrap();
        let ticker = Ticker24h::fallback(&seed);

        assert_eq!(ticker.symbol, "BTC/USDT");
        assert_eq!(ticker.last_price, seed.last_price());
        assert_eq!(ticker.change_percent, seed.change_percent);
        assert!(ticker.low < ticker.last_price && ticker.last_price < ticker.high);
        assert!(!ticker.is_live());
    }

    #[tokio::test]
    async fn test_poll_falls_back_on_failure() {
        let source = Arc::new(FailingSource {
            calls: AtomicUsize::new(0),
        });
        let feed = TickerFeed::new(source.clone());
        let instrument = InstrumentCatalog::global().get("ETH/USDT").unwrap();

        let ticker = feed.poll(instrument).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(ticker, Ticker24h {
            received_at: ticker.received_at,
            ..Ticker24h::fallback(&instrument.seed())
        });
    }

    #[tokio::test]
    async fn test_poll_live_uses_catalog_symbol() {
        let feed = TickerFeed::new(Arc::new(StaticSource));
        let instrument = InstrumentCatalog::global().get("BTC/USDT").unwrap();

        let ticker = feed.poll(instrument).await;
        assert_eq!(ticker.symbol, "BTC/USDT");
        assert_eq!(ticker.last_price, 70_000.0);
        assert!(ticker.is_live());
    }

    #[tokio::test]
    async fn test_poll_without_ticker_symbol_skips_source() {
        let source = Arc::new(FailingSource {
            calls: AtomicUsize::new(0),
        });
        let feed = TickerFeed::new(source.clone());
        let instrument = InstrumentCatalog::global().get("AAPL").unwrap();

        let ticker = feed.poll(instrument).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(ticker.origin, TickerOrigin::Fallback);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_polling_retries_each_interval() {
        let source = Arc::new(FailingSource {
            calls: AtomicUsize::new(0),
        });
        let feed = TickerFeed::new(source.clone());
        let instrument = InstrumentCatalog::global().get("SOL/USDT").unwrap().clone();
        let (tx, mut rx) = mpsc::channel(8);

        let mut handle = feed.spawn_polling(instrument, Duration::from_secs(10), tx);

        for _ in 0..3 {
            let ticker = rx.recv().await.unwrap();
            assert_eq!(ticker.symbol, "SOL/USDT");
            assert_eq!(ticker.origin, TickerOrigin::Fallback);
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);

        handle.cancel();
        assert!(rx.recv().await.is_none());
    }
}
