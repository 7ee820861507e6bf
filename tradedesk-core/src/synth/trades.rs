//! Synthetic recent-trades tape shown beside the order book.

use crate::{
    catalog::{InstrumentSeed, round_to},
    types::{Side, SyntheticTrade},
};
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;

/// Max distance of a printed trade from the last price
const PRICE_JITTER: f64 = 0.001;

pub fn generate(seed: &InstrumentSeed, count: usize) -> Vec<SyntheticTrade> {
    generate_with(seed, count, Utc::now(), &mut rand::rng())
}

/// Generate `count` trades, newest first, the newest printed at `anchor`.
pub fn generate_with<R>(
    seed: &InstrumentSeed,
    count: usize,
    anchor: DateTime<Utc>,
    rng: &mut R,
) -> Vec<SyntheticTrade>
where
    R: Rng + ?Sized,
{
    let profile = seed.profile();
    let last_price = seed.last_price();
    let jitter = last_price * PRICE_JITTER;
    let mut time = anchor;

    (0..count)
        .map(|_| {
            let price = round_to(
                last_price + rng.random_range(-jitter..=jitter),
                seed.decimal_places,
            )
            .max(seed.price_unit());
            let trade = SyntheticTrade {
                time_label: time.format("%H:%M:%S").to_string(),
                price,
                amount: round_to(rng.random_range(profile.depth_amount.clone()), 4),
                side: if rng.random_bool(0.5) { Side::Buy } else { Side::Sell },
            };
            time -= TimeDelta::seconds(rng.random_range(1..=6));
            trade
        })
        .collect()
}
