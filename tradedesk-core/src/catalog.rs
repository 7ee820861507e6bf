//! Static instrument reference data and the seeds synthetic market data grows from.
//!
//! The catalog is built once on first access and never mutated. Every trading page looks
//! up its instrument here, then derives an [`InstrumentSeed`] to feed the synthesizers.

use crate::error::TerminalError;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::OnceLock;

/// Instrument class, one per trading page family
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum InstrumentClass {
    Crypto,
    Forex,
    Futures,
    Commodities,
    Stocks,
    BinaryOptions,
}

/// Synthesis parameters for an [`InstrumentClass`]
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisProfile {
    /// Max chart noise as a fraction of the base price
    pub noise_fraction: f64,
    /// Order book tick as a fraction of the base price (floored to one price unit)
    pub tick_fraction: f64,
    /// Range of amounts resting on a book level
    pub depth_amount: Range<f64>,
    /// Range of per-point chart volume
    pub volume: Range<u64>,
}

impl InstrumentClass {
    pub const ALL: [InstrumentClass; 6] = [
        InstrumentClass::Crypto,
        InstrumentClass::Forex,
        InstrumentClass::Futures,
        InstrumentClass::Commodities,
        InstrumentClass::Stocks,
        InstrumentClass::BinaryOptions,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InstrumentClass::Crypto => "Crypto",
            InstrumentClass::Forex => "Forex",
            InstrumentClass::Futures => "Futures",
            InstrumentClass::Commodities => "Commodities",
            InstrumentClass::Stocks => "Stocks",
            InstrumentClass::BinaryOptions => "Options",
        }
    }

    pub fn profile(&self) -> SynthesisProfile {
        match self {
            InstrumentClass::Crypto => SynthesisProfile {
                noise_fraction: 0.02,
                tick_fraction: 0.0002,
                depth_amount: 0.01..5.0,
                volume: 100..5_000,
            },
            InstrumentClass::Forex => SynthesisProfile {
                noise_fraction: 0.01,
                tick_fraction: 0.000_05,
                depth_amount: 0.5..50.0,
                volume: 1_000..50_000,
            },
            InstrumentClass::Futures => SynthesisProfile {
                noise_fraction: 0.015,
                tick_fraction: 0.0001,
                depth_amount: 1.0..120.0,
                volume: 500..20_000,
            },
            InstrumentClass::Commodities => SynthesisProfile {
                noise_fraction: 0.01,
                tick_fraction: 0.0001,
                depth_amount: 1.0..80.0,
                volume: 200..10_000,
            },
            InstrumentClass::Stocks => SynthesisProfile {
                noise_fraction: 0.015,
                tick_fraction: 0.0002,
                depth_amount: 10.0..2_000.0,
                volume: 1_000..100_000,
            },
            // Round-based contracts render a much calmer book
            InstrumentClass::BinaryOptions => SynthesisProfile {
                noise_fraction: 0.005,
                tick_fraction: 0.0001,
                depth_amount: 0.01..3.0,
                volume: 100..3_000,
            },
        }
    }

    /// Next class in tab order, wrapping around
    pub fn next(&self) -> Self {
        let index = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for InstrumentClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Decimal places used to display (and round) prices of an instrument
pub fn decimal_places_for(class: InstrumentClass, symbol: &str, base_price: f64) -> u32 {
    match class {
        InstrumentClass::Forex if symbol.contains("JPY") => 2,
        InstrumentClass::Forex => 4,
        InstrumentClass::Crypto | InstrumentClass::BinaryOptions => match base_price {
            p if p >= 1_000.0 => 2,
            p if p >= 0.01 => 4,
            _ => 8,
        },
        _ => match base_price {
            p if p >= 1.0 => 2,
            p if p >= 0.01 => 4,
            _ => 8,
        },
    }
}

/// Round `value` to `decimal_places`
pub fn round_to(value: f64, decimal_places: u32) -> f64 {
    let factor = 10f64.powi(decimal_places as i32);
    (value * factor).round() / factor
}

/// Minimal seed every synthetic series, book and tape for an instrument is derived from
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InstrumentSeed {
    pub symbol: String,
    pub display_name: String,
    pub unit: String,
    pub class: InstrumentClass,
    pub base_price: f64,
    pub change_percent: f64,
    pub decimal_places: u32,
}

impl InstrumentSeed {
    pub fn new(
        symbol: impl Into<String>,
        display_name: impl Into<String>,
        unit: impl Into<String>,
        class: InstrumentClass,
        base_price: f64,
        change_percent: f64,
    ) -> Self {
        let symbol = symbol.into();
        let decimal_places = decimal_places_for(class, &symbol, base_price);
        Self {
            symbol,
            display_name: display_name.into(),
            unit: unit.into(),
            class,
            base_price,
            change_percent,
            decimal_places,
        }
    }

    /// Price the instrument trades at after the day's change is applied
    ///
    /// This is the value charts terminate at and tickers display.
    pub fn last_price(&self) -> f64 {
        round_to(
            self.base_price * (1.0 + self.change_percent / 100.0),
            self.decimal_places,
        )
    }

    /// Copy of this seed anchored on a different base price
    ///
    /// Display precision follows the new price, so crossing a magnitude threshold changes it.
    pub fn repriced(&self, base_price: f64) -> Self {
        Self {
            base_price,
            decimal_places: decimal_places_for(self.class, &self.symbol, base_price),
            ..self.clone()
        }
    }

    /// Smallest representable price step
    pub fn price_unit(&self) -> f64 {
        10f64.powi(-(self.decimal_places as i32))
    }

    pub fn profile(&self) -> SynthesisProfile {
        self.class.profile()
    }
}

/// Catalog entry for one tradable instrument
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentInfo {
    pub symbol: &'static str,
    pub display_name: &'static str,
    pub icon: &'static str,
    pub unit: &'static str,
    pub class: InstrumentClass,
    /// Symbol on the public ticker endpoint, when one exists
    pub ticker_symbol: Option<&'static str>,
    pub reference_price: f64,
    pub reference_change_percent: f64,
}

impl InstrumentInfo {
    pub fn seed(&self) -> InstrumentSeed {
        InstrumentSeed::new(
            self.symbol,
            self.display_name,
            self.unit,
            self.class,
            self.reference_price,
            self.reference_change_percent,
        )
    }
}

/// Read-only instrument reference data for all classes
#[derive(Debug)]
pub struct InstrumentCatalog {
    instruments: Vec<InstrumentInfo>,
}

impl InstrumentCatalog {
    /// Process-wide catalog, built on first use
    pub fn global() -> &'static InstrumentCatalog {
        static CATALOG: OnceLock<InstrumentCatalog> = OnceLock::new();
        CATALOG.get_or_init(|| InstrumentCatalog::new(default_instruments()))
    }

    pub fn new(instruments: Vec<InstrumentInfo>) -> Self {
        Self { instruments }
    }

    pub fn get(&self, symbol: &str) -> Result<&InstrumentInfo, TerminalError> {
        self.instruments
            .iter()
            .find(|info| info.symbol == symbol)
            .ok_or_else(|| TerminalError::InvalidArgument(format!("unknown instrument: {symbol}")))
    }

    pub fn seed(&self, symbol: &str) -> Result<InstrumentSeed, TerminalError> {
        self.get(symbol).map(InstrumentInfo::seed)
    }

    pub fn by_class(&self, class: InstrumentClass) -> impl Iterator<Item = &InstrumentInfo> {
        self.instruments.iter().filter(move |info| info.class == class)
    }

    /// Classes with at least one instrument, in tab order
    pub fn classes(&self) -> Vec<InstrumentClass> {
        InstrumentClass::ALL
            .into_iter()
            .filter(|class| self.first_of(*class).is_some())
            .collect()
    }

    pub fn first_of(&self, class: InstrumentClass) -> Option<&InstrumentInfo> {
        self.by_class(class).next()
    }

    pub fn all(&self) -> &[InstrumentInfo] {
        &self.instruments
    }
}

#[allow(clippy::too_many_arguments)]
fn instrument(
    symbol: &'static str,
    display_name: &'static str,
    icon: &'static str,
    unit: &'static str,
    class: InstrumentClass,
    ticker_symbol: Option<&'static str>,
    reference_price: f64,
    reference_change_percent: f64,
) -> InstrumentInfo {
    InstrumentInfo {
        symbol,
        display_name,
        icon,
        unit,
        class,
        ticker_symbol,
        reference_price,
        reference_change_percent,
    }
}

fn default_instruments() -> Vec<InstrumentInfo> {
    use InstrumentClass::*;

    vec![
        // Spot crypto
        instrument("BTC/USDT", "Bitcoin", "btc", "BTC", Crypto, Some("BTCUSDT"), 67_250.0, 2.35),
        instrument("ETH/USDT", "Ethereum", "eth", "ETH", Crypto, Some("ETHUSDT"), 3_480.5, 1.12),
        instrument("SOL/USDT", "Solana", "sol", "SOL", Crypto, Some("SOLUSDT"), 152.34, -0.87),
        instrument("XRP/USDT", "XRP", "xrp", "XRP", Crypto, Some("XRPUSDT"), 0.5234, 3.4),
        instrument("DOGE/USDT", "Dogecoin", "doge", "DOGE", Crypto, Some("DOGEUSDT"), 0.1587, -1.9),
        // Forex
        instrument("EUR/USD", "Euro / US Dollar", "eur", "lot", Forex, None, 1.0845, 0.12),
        instrument("GBP/USD", "British Pound / US Dollar", "gbp", "lot", Forex, None, 1.2712, -0.08),
        instrument("USD/JPY", "US Dollar / Japanese Yen", "jpy", "lot", Forex, None, 151.42, 0.35),
        instrument("AUD/USD", "Australian Dollar / US Dollar", "aud", "lot", Forex, None, 0.6578, -0.21),
        // Futures
        instrument("ES", "E-mini S&P 500", "es", "contract", Futures, None, 5_235.25, 0.45),
        instrument("NQ", "E-mini Nasdaq-100", "nq", "contract", Futures, None, 18_310.5, 0.62),
        instrument("YM", "E-mini Dow", "ym", "contract", Futures, None, 39_120.0, 0.21),
        // Commodities
        instrument("XAU/USD", "Gold", "gold", "oz", Commodities, None, 2_345.6, 0.84),
        instrument("XAG/USD", "Silver", "silver", "oz", Commodities, None, 27.85, 1.2),
        instrument("WTI", "WTI Crude Oil", "oil", "bbl", Commodities, None, 81.32, -0.65),
        instrument("NG", "Natural Gas", "gas", "MMBtu", Commodities, None, 2.145, -2.1),
        // Stocks
        instrument("AAPL", "Apple Inc.", "aapl", "share", Stocks, None, 189.84, 0.75),
        instrument("TSLA", "Tesla Inc.", "tsla", "share", Stocks, None, 174.6, -2.4),
        instrument("NVDA", "NVIDIA Corp.", "nvda", "share", Stocks, None, 903.56, 3.1),
        instrument("MSFT", "Microsoft Corp.", "msft", "share", Stocks, None, 421.9, 0.4),
        // Binary options on the same underlyings
        instrument("BTC/USDT:OPT", "Bitcoin Up/Down", "btc", "USDT", BinaryOptions, Some("BTCUSDT"), 67_250.0, 2.35),
        instrument("ETH/USDT:OPT", "Ethereum Up/Down", "eth", "USDT", BinaryOptions, Some("ETHUSDT"), 3_480.5, 1.12),
        instrument("EUR/USD:OPT", "Euro Up/Down", "eur", "USD", BinaryOptions, None, 1.0845, 0.12),
    ]
}
