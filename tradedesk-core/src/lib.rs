/// Tradedesk - Core Library
///
/// Market-data and calculation layer behind the multi-asset trading pages:
/// - Synthetic chart series, order books and trade tapes per instrument class
/// - Order-entry calculation graph (percentage, quantity, leverage, fees)
/// - Cyclic expiry rounds for binary options
/// - Per-page sessions that publish whole snapshots and refresh them on a schedule
/// - 24h ticker polling with a synthetic fallback, and the authenticated asset backend
pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod expiry;
pub mod order_entry;
pub mod schedule;
pub mod session;
pub mod synth;
pub mod ticker;
pub mod types;
pub mod watchlist;

// Re-export commonly used types for convenience
pub use catalog::{InstrumentCatalog, InstrumentClass, InstrumentInfo, InstrumentSeed};
pub use config::TerminalConfig;
pub use error::TerminalError;
pub use types::{
    OrderBookLevel, OrderBookSnapshot, OrderMode, PricePoint, Side, SyntheticTrade, Timeframe,
};

pub use expiry::{
    BinaryPosition, Clock, Countdown, Direction, ExpiryConfig, ExpiryEvent, ExpiryTimer,
    ManualClock, Outcome, RoundPhase, Settlement, SystemClock,
};
pub use order_entry::{OrderEntryConfig, OrderEntryGraph, OrderEntrySnapshot};
pub use watchlist::WatchlistStore;

pub use backend::{AssetBalance, BackendClient, Transaction, TransactionKind};
pub use schedule::{RefreshHandle, RefreshScheduler};
pub use session::{ExpiryTick, MarketSnapshot, OpenBinary, PageSession};
pub use ticker::{HttpTickerSource, Ticker24h, TickerFeed, TickerOrigin, TickerSource};
