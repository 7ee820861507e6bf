//! Synthetic chart series.
//!
//! A series drifts linearly from the seed's base price towards its day change, with
//! bounded uniform noise on every point except the last, which lands exactly on the
//! seed's last price so the chart agrees with the ticker.

use crate::{
    catalog::{InstrumentSeed, round_to},
    error::TerminalError,
    types::{PricePoint, Timeframe},
};
use chrono::{DateTime, Utc};
use rand::Rng;

/// Generate a fresh series for `seed` using the thread RNG and the current time.
pub fn generate(seed: &InstrumentSeed, timeframe: Timeframe) -> Vec<PricePoint> {
    generate_with(seed, timeframe, Utc::now(), &mut rand::rng())
}

/// Generate a series from a timeframe key such as `"1D"`.
pub fn generate_for_key(seed: &InstrumentSeed, key: &str) -> Result<Vec<PricePoint>, TerminalError> {
    let timeframe = key.parse::<Timeframe>()?;
    Ok(generate(seed, timeframe))
}

/// Generate a series with an explicit label anchor and random source.
///
/// The last point is labelled with `anchor`; earlier points step back by
/// [`Timeframe::step`].
pub fn generate_with<R>(
    seed: &InstrumentSeed,
    timeframe: Timeframe,
    anchor: DateTime<Utc>,
    rng: &mut R,
) -> Vec<PricePoint>
where
    R: Rng + ?Sized,
{
    let count = timeframe.point_count();
    let profile = seed.profile();
    let noise_bound = (profile.noise_fraction * seed.base_price).abs();
    let floor = seed.price_unit();
    let last = count - 1;

    (0..count)
        .map(|index| {
            let price = if index == last {
                seed.last_price()
            } else {
                let noise = rng.random_range(-noise_bound..=noise_bound);
                let raw = seed.base_price + noise + trend_contribution(seed, index, count);
                round_to(raw, seed.decimal_places)
            };

            let steps_back = (last - index) as i32;
            let time = anchor - timeframe.step() * steps_back;

            PricePoint {
                time_label: time.format(timeframe.label_format()).to_string(),
                price: if price.is_finite() { price.max(floor) } else { floor },
                volume: rng.random_range(profile.volume.clone()),
            }
        })
        .collect()
}

/// Share of the day change accumulated by point `index` of `count`
fn trend_contribution(seed: &InstrumentSeed, index: usize, count: usize) -> f64 {
    if count < 2 {
        return seed.change_percent / 100.0 * seed.base_price;
    }
    seed.change_percent / 100.0 * seed.base_price * (index as f64 / (count - 1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{InstrumentCatalog, InstrumentClass};
    use chrono::TimeZone;
    use rand::{SeedableRng, rngs::StdRng};

    fn anchor() -> DateTime<Utc> {
        // Wednesday
        Utc.with_ymd_and_hms(2024, 5, 15, 14, 30, 0).unwrap()
    }

    #[test]
    fn test_series_length_matches_timeframe() {
        let seed = InstrumentCatalog::global().seed("BTC/USDT").unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for timeframe in Timeframe::ALL {
            let series = generate_with(&seed, timeframe, anchor(), &mut rng);
            assert_eq!(series.len(), timeframe.point_count(), "{timeframe}");
        }
    }

    #[test]
    fn test_series_ends_on_day_change() {
        let seed = InstrumentSeed::new("TEST", "Test", "u", InstrumentClass::Stocks, 100.0, 5.0);
        let mut rng = StdRng::seed_from_u64(42);

        let series = generate_with(&seed, Timeframe::OneDay, anchor(), &mut rng);

        assert_eq!(series.len(), 7);
        let last = series.last().unwrap().price;
        let noise_bound = seed.profile().noise_fraction * seed.base_price;
        assert!((last - 105.0).abs() <= noise_bound);
        assert_eq!(last, seed.last_price());
    }

    #[test]
    fn test_series_stays_within_noise_and_trend() {
        let seed = InstrumentCatalog::global().seed("EUR/USD").unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let bound = seed.profile().noise_fraction * seed.base_price;
        let max_trend = (seed.change_percent / 100.0 * seed.base_price).abs();

        for point in generate_with(&seed, Timeframe::OneMonth, anchor(), &mut rng) {
            let distance = (point.price - seed.base_price).abs();
            assert!(distance <= bound + max_trend + seed.price_unit(), "{point:?}");
        }
    }

    #[test]
    fn test_series_rounded_and_positive() {
        // Noise larger than the price itself would dip below zero without the clamp
        let mut seed = InstrumentSeed::new("DUST", "Dust", "u", InstrumentClass::Crypto, 0.0001, -99.0);
        seed.decimal_places = 4;
        let mut rng = StdRng::seed_from_u64(11);

        for point in generate_with(&seed, Timeframe::OneMonth, anchor(), &mut rng) {
            assert!(point.price > 0.0);
            assert!(point.price.is_finite());
            let scaled = point.price * 10_000.0;
            assert!((scaled - scaled.round()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_series_labels() {
        let seed = InstrumentCatalog::global().seed("AAPL").unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let minutes = generate_with(&seed, Timeframe::OneMinute, anchor(), &mut rng);
        assert_eq!(minutes.last().unwrap().time_label, "14:30");
        assert_eq!(minutes[minutes.len() - 2].time_label, "14:29");

        let hours = generate_with(&seed, Timeframe::OneHour, anchor(), &mut rng);
        assert_eq!(hours.last().unwrap().time_label, "14:00");
        assert_eq!(hours.first().unwrap().time_label, "15:00");

        let days = generate_with(&seed, Timeframe::OneDay, anchor(), &mut rng);
        let labels: Vec<_> = days.iter().map(|p| p.time_label.as_str()).collect();
        assert_eq!(labels, ["Thu", "Fri", "Sat", "Sun", "Mon", "Tue", "Wed"]);

        let month = generate_with(&seed, Timeframe::OneMonth, anchor(), &mut rng);
        assert_eq!(month.last().unwrap().time_label, "May 15");
    }

    #[test]
    fn test_series_regenerates_differently() {
        let seed = InstrumentCatalog::global().seed("ETH/USDT").unwrap();
        let first = generate(&seed, Timeframe::OneMonth);
        let second = generate(&seed, Timeframe::OneMonth);

        assert_eq!(first.len(), second.len());
        assert_eq!(first.last().unwrap().price, second.last().unwrap().price);
        assert_ne!(first, second);
    }

    #[test]
    fn test_unknown_timeframe_key() {
        let seed = InstrumentCatalog::global().seed("ETH/USDT").unwrap();
        assert!(matches!(
            generate_for_key(&seed, "15m"),
            Err(TerminalError::InvalidArgument(_))
        ));
        assert_eq!(generate_for_key(&seed, "1W").unwrap().len(), 30);
    }
}
