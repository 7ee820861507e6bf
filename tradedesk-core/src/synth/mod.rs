//! Synthetic market data
//!
//! Provides:
//! - Chart series per timeframe ([`series`])
//! - Bid/ask ladders ([`book`])
//! - Recent trades tape ([`trades`])
//! - Mark-price drift between refreshes ([`drift`])
//!
//! Every generator is a pure function of its seed plus random draws. Callers regenerate
//! whole outputs; nothing is mutated in place.

pub mod book;
pub mod drift;
pub mod series;
pub mod trades;

pub use book::{DEFAULT_BOOK_DEPTH, MAX_BOOK_DEPTH, OrderBookSynthesizer};
