/// Core data types shared by the synthesizers, the order-entry graph and the page session
///
/// Everything here is plain data: serializable, cloneable and free of any UI dependency.
use crate::error::TerminalError;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Order side (Buy or Sell)
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Buy,
    Sell,
}

impl Side {
    /// Convert to display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "Buy",
            Side::Sell => "Sell",
        }
    }

    /// Check if this is a buy order
    pub fn is_buy(&self) -> bool {
        matches!(self, Side::Buy)
    }

    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Price type of the order-entry form
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
pub enum OrderMode {
    #[default]
    Market,
    Limit,
}

impl OrderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderMode::Market => "Market",
            OrderMode::Limit => "Limit",
        }
    }
}

impl std::fmt::Display for OrderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Chart granularity selectable on every trading page
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash, Default)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "1h")]
    OneHour,
    #[default]
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
}

impl Timeframe {
    pub const ALL: [Timeframe; 5] = [
        Timeframe::OneMinute,
        Timeframe::OneHour,
        Timeframe::OneDay,
        Timeframe::OneWeek,
        Timeframe::OneMonth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneMinute => "1m",
            Timeframe::OneHour => "1h",
            Timeframe::OneDay => "1D",
            Timeframe::OneWeek => "1W",
            Timeframe::OneMonth => "1M",
        }
    }

    /// Number of points a chart of this timeframe holds
    pub fn point_count(&self) -> usize {
        match self {
            Timeframe::OneMinute => 30,
            Timeframe::OneHour => 24,
            Timeframe::OneDay => 7,
            Timeframe::OneWeek => 30,
            Timeframe::OneMonth => 90,
        }
    }

    /// Distance between two consecutive point labels
    pub fn step(&self) -> TimeDelta {
        match self {
            Timeframe::OneMinute => TimeDelta::minutes(1),
            Timeframe::OneHour => TimeDelta::hours(1),
            Timeframe::OneDay | Timeframe::OneWeek | Timeframe::OneMonth => TimeDelta::days(1),
        }
    }

    /// `chrono` format string for the point labels
    pub fn label_format(&self) -> &'static str {
        match self {
            Timeframe::OneMinute => "%H:%M",
            Timeframe::OneHour => "%H:00",
            Timeframe::OneDay => "%a",
            Timeframe::OneWeek => "%d",
            Timeframe::OneMonth => "%b %d",
        }
    }

    /// Next timeframe in display order, wrapping around
    pub fn next(&self) -> Self {
        let index = Self::ALL.iter().position(|tf| tf == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl FromStr for Timeframe {
    type Err = TerminalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tf| tf.as_str() == s)
            .ok_or_else(|| TerminalError::InvalidArgument(format!("unsupported timeframe: {s}")))
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One chart point
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PricePoint {
    pub time_label: String,
    pub price: f64,
    pub volume: u64,
}

/// Price/quantity level in an order book
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct OrderBookLevel {
    /// Price level
    pub price: f64,
    /// Quantity at this level
    pub amount: f64,
}

/// Both ladders of a synthetic order book
///
/// `bids` run from the best (highest) bid downwards, `asks` from the best (lowest) ask upwards.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OrderBookSnapshot {
    pub bids: Vec<OrderBookLevel>,
    pub asks: Vec<OrderBookLevel>,
}

impl OrderBookSnapshot {
    pub fn best_bid(&self) -> Option<&OrderBookLevel> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&OrderBookLevel> {
        self.asks.first()
    }

    /// Calculate the bid-ask spread
    pub fn spread(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.price - bid.price),
            _ => None,
        }
    }

    /// Calculate the mid price
    pub fn mid_price(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid.price + ask.price) / 2.0),
            _ => None,
        }
    }

    /// Calculate spread as a percentage of mid price
    pub fn spread_percentage(&self) -> Option<f64> {
        let spread = self.spread()?;
        let mid = self.mid_price()?;

        if mid > 0.0 {
            Some(spread / mid * 100.0)
        } else {
            None
        }
    }

    /// Largest amount on either side, used to scale depth bars
    pub fn max_amount(&self) -> f64 {
        self.bids
            .iter()
            .chain(self.asks.iter())
            .map(|level| level.amount)
            .fold(0.0, f64::max)
    }

    /// Check the ladder ordering and that the book is not crossed
    pub fn is_well_formed(&self) -> bool {
        let bids_ordered = self.bids.windows(2).all(|w| w[0].price > w[1].price);
        let asks_ordered = self.asks.windows(2).all(|w| w[0].price < w[1].price);
        let uncrossed = match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid.price < ask.price,
            _ => true,
        };
        bids_ordered && asks_ordered && uncrossed
    }
}

/// Trade printed on the synthetic tape
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SyntheticTrade {
    pub time_label: String,
    pub price: f64,
    pub amount: f64,
    pub side: Side,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_display() {
        assert_eq!(Side::Buy.to_string(), "Buy");
        assert_eq!(Side::Sell.to_string(), "Sell");
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert!(Side::Buy.is_buy());
        assert!(!Side::Sell.is_buy());
    }

    #[test]
    fn test_timeframe_parse() {
        for tf in Timeframe::ALL {
            assert_eq!(tf.as_str().parse::<Timeframe>(), Ok(tf));
        }

        // Case matters: "1m" is one minute, "1M" one month
        assert_eq!("1M".parse::<Timeframe>(), Ok(Timeframe::OneMonth));
        assert!(matches!(
            "5m".parse::<Timeframe>(),
            Err(TerminalError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_timeframe_cycle() {
        assert_eq!(Timeframe::OneMonth.next(), Timeframe::OneMinute);
        assert_eq!(Timeframe::OneDay.next(), Timeframe::OneWeek);
    }

    #[test]
    fn test_orderbook_calculations() {
        let book = OrderBookSnapshot {
            bids: vec![
                OrderBookLevel { price: 100.0, amount: 1.5 },
                OrderBookLevel { price: 99.5, amount: 4.0 },
            ],
            asks: vec![
                OrderBookLevel { price: 100.5, amount: 2.0 },
                OrderBookLevel { price: 101.0, amount: 0.5 },
            ],
        };

        assert_eq!(book.spread(), Some(0.5));
        assert_eq!(book.mid_price(), Some(100.25));
        assert_eq!(book.max_amount(), 4.0);
        assert!(book.is_well_formed());

        let spread_pct = book.spread_percentage().unwrap();
        assert!((spread_pct - 0.4987).abs() < 0.001); // ~0.5%
    }

    #[test]
    fn test_crossed_book_is_not_well_formed() {
        let book = OrderBookSnapshot {
            bids: vec![OrderBookLevel { price: 101.0, amount: 1.0 }],
            asks: vec![OrderBookLevel { price: 100.0, amount: 1.0 }],
        };
        assert!(!book.is_well_formed());
    }
}
