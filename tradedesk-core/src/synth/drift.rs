//! Mark-price drift between book refreshes.

use crate::catalog::{InstrumentSeed, round_to};
use rand::Rng;

/// Largest move per step, in book ticks
const MAX_STEP_TICKS: u32 = 2;

/// Step the seed's base price using the thread RNG.
pub fn step(seed: &InstrumentSeed) -> InstrumentSeed {
    step_with(seed, &mut rand::rng())
}

/// Move the base price up or down by one to [`MAX_STEP_TICKS`] book ticks.
///
/// A tick is the profile's tick fraction of the price, floored to one price unit, so
/// every step is visible at display precision. The price never drops below one unit.
pub fn step_with<R>(seed: &InstrumentSeed, rng: &mut R) -> InstrumentSeed
where
    R: Rng + ?Sized,
{
    let unit = seed.price_unit();
    let tick = (seed.base_price * seed.profile().tick_fraction).max(unit);
    let ticks = f64::from(rng.random_range(1..=MAX_STEP_TICKS));
    let step = if rng.random_bool(0.5) { ticks } else { -ticks } * tick;

    let base_price = round_to(seed.base_price + step, seed.decimal_places);
    seed.repriced(if base_price.is_finite() { base_price.max(unit) } else { seed.base_price })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{InstrumentCatalog, InstrumentClass};
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_step_moves_within_two_ticks() {
        let mut rng = StdRng::seed_from_u64(7);

        for info in InstrumentCatalog::global().all() {
            let seed = info.seed();
            let tick = (seed.base_price * seed.profile().tick_fraction).max(seed.price_unit());
            let stepped = step_with(&seed, &mut rng);

            let moved = (stepped.base_price - seed.base_price).abs();
            assert!(moved > 0.0, "{}", info.symbol);
            assert!(moved <= 2.0 * tick + seed.price_unit(), "{}", info.symbol);
            assert_eq!(stepped.symbol, seed.symbol);
            assert_eq!(stepped.change_percent, seed.change_percent);
        }
    }

    #[test]
    fn test_step_stays_positive() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seed = InstrumentSeed::new("DUST", "Dust", "u", InstrumentClass::Stocks, 0.03, 0.0);

        for _ in 0..200 {
            seed = step_with(&seed, &mut rng);
            assert!(seed.base_price >= seed.price_unit());
        }
    }
}
