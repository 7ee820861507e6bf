//! Synthetic order book ladders.

use crate::{
    catalog::{InstrumentSeed, round_to},
    error::TerminalError,
    types::{OrderBookLevel, OrderBookSnapshot},
};
use rand::Rng;

/// Default number of levels per side.
pub const DEFAULT_BOOK_DEPTH: usize = 15;

/// Upper bound on levels per side, keeps a regeneration within one scheduler tick.
pub const MAX_BOOK_DEPTH: usize = 40;

/// Decimal places of a level amount
const AMOUNT_DECIMALS: u32 = 4;

/// Builds bid/ask ladders around a seed's base price.
///
/// Prices sit on an integer grid of the seed's price unit, so ordering survives rounding:
/// `bid(k) = mid - (k + 1) * tick`, `ask(k) = mid + (k + 1) * tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBookSynthesizer {
    depth: usize,
}

impl Default for OrderBookSynthesizer {
    fn default() -> Self {
        Self {
            depth: DEFAULT_BOOK_DEPTH,
        }
    }
}

impl OrderBookSynthesizer {
    pub fn new(depth: usize) -> Result<Self, TerminalError> {
        if depth == 0 || depth > MAX_BOOK_DEPTH {
            return Err(TerminalError::InvalidArgument(format!(
                "book depth must be within 1..={MAX_BOOK_DEPTH}, got {depth}"
            )));
        }
        Ok(Self { depth })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Generate a fresh book using the thread RNG.
    pub fn generate(&self, seed: &InstrumentSeed) -> OrderBookSnapshot {
        self.generate_with(seed, &mut rand::rng())
    }

    pub fn generate_with<R>(&self, seed: &InstrumentSeed, rng: &mut R) -> OrderBookSnapshot
    where
        R: Rng + ?Sized,
    {
        let profile = seed.profile();
        let scale = 10f64.powi(seed.decimal_places as i32);
        let mid_units = (seed.base_price * scale).round() as i64;
        let tick_units = ((seed.base_price * profile.tick_fraction * scale).round() as i64).max(1);

        let mut level = |units: i64| OrderBookLevel {
            price: units as f64 / scale,
            amount: round_to(rng.random_range(profile.depth_amount.clone()), AMOUNT_DECIMALS)
                .max(10f64.powi(-(AMOUNT_DECIMALS as i32))),
        };

        let bids = (0..self.depth as i64)
            .map(|k| mid_units - (k + 1) * tick_units)
            .take_while(|units| *units > 0)
            .map(&mut level)
            .collect();

        let asks = (0..self.depth as i64)
            .map(|k| mid_units + (k + 1) * tick_units)
            .map(&mut level)
            .collect();

        OrderBookSnapshot { bids, asks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{InstrumentCatalog, InstrumentClass};
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_depth_bounds() {
        assert!(OrderBookSynthesizer::new(0).is_err());
        assert!(OrderBookSynthesizer::new(MAX_BOOK_DEPTH + 1).is_err());
        assert_eq!(OrderBookSynthesizer::new(12).unwrap().depth(), 12);
    }

    #[test]
    fn test_book_well_formed_for_every_instrument() {
        let synthesizer = OrderBookSynthesizer::default();
        let mut rng = StdRng::seed_from_u64(99);

        for info in InstrumentCatalog::global().all() {
            let seed = info.seed();
            let book = synthesizer.generate_with(&seed, &mut rng);

            assert_eq!(book.bids.len(), DEFAULT_BOOK_DEPTH, "{}", info.symbol);
            assert_eq!(book.asks.len(), DEFAULT_BOOK_DEPTH, "{}", info.symbol);
            assert!(book.is_well_formed(), "{}", info.symbol);

            for level in book.bids.iter().chain(book.asks.iter()) {
                assert_ne!(level.price, seed.base_price, "{}", info.symbol);
                assert!(level.amount > 0.0);
            }
            assert!(book.best_bid().unwrap().price < seed.base_price);
            assert!(book.best_ask().unwrap().price > seed.base_price);
        }
    }

    #[test]
    fn test_tick_floors_to_price_unit() {
        // 1.0845 * 0.00005 is below one pip, so the ladder steps by exactly one pip
        let seed = InstrumentCatalog::global().seed("EUR/USD").unwrap();
        let book = OrderBookSynthesizer::new(3)
            .unwrap()
            .generate_with(&seed, &mut StdRng::seed_from_u64(5));

        let bids: Vec<_> = book.bids.iter().map(|l| l.price).collect();
        let asks: Vec<_> = book.asks.iter().map(|l| l.price).collect();
        assert_eq!(bids, [1.0844, 1.0843, 1.0842]);
        assert_eq!(asks, [1.0846, 1.0847, 1.0848]);
    }

    #[test]
    fn test_cheap_instrument_drops_non_positive_bids() {
        let mut seed = InstrumentSeed::new("DUST", "Dust", "u", InstrumentClass::Stocks, 0.03, 0.0);
        seed.decimal_places = 2;
        let book = OrderBookSynthesizer::new(10)
            .unwrap()
            .generate_with(&seed, &mut StdRng::seed_from_u64(5));

        assert_eq!(book.bids.len(), 2);
        assert_eq!(book.asks.len(), 10);
        assert!(book.is_well_formed());
        assert!(book.bids.iter().all(|level| level.price > 0.0));
    }
}
