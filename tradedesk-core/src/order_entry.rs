//! Order-entry calculation graph.
//!
//! Keeps the percentage slider, quantity, leverage and the derived margin / notional /
//! fee figures consistent whichever field the user edits. Every mutation runs exactly one
//! recomputation pass; there is no re-triggering between fields.
//!
//! Invariant after every operation:
//! `quantity * reference_price ≈ available_balance * percentage / 100`.

use crate::{
    error::TerminalError,
    types::{OrderMode, Side},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default taker fee applied to the notional
pub const DEFAULT_FEE_RATE: f64 = 0.001;

/// Default leverage ceiling
pub const DEFAULT_MAX_LEVERAGE: u32 = 125;

/// Static parameters of an order-entry form
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct OrderEntryConfig {
    pub fee_rate: f64,
    pub max_leverage: u32,
}

impl Default for OrderEntryConfig {
    fn default() -> Self {
        Self {
            fee_rate: DEFAULT_FEE_RATE,
            max_leverage: DEFAULT_MAX_LEVERAGE,
        }
    }
}

/// Serializable view of the form for the presentation layer
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OrderEntrySnapshot {
    pub mode: OrderMode,
    pub side: Side,
    pub limit_price: Option<f64>,
    pub reference_price: f64,
    pub quantity: f64,
    pub percentage: f64,
    pub slider_position: u8,
    pub leverage: u32,
    pub available_balance: f64,
    pub notional: f64,
    pub margin: f64,
    pub fee: f64,
    /// Cost for buys, proceeds for sells
    pub estimated_total: f64,
}

/// Reactive state of one order-entry form
#[derive(Debug, Clone, PartialEq)]
pub struct OrderEntryGraph {
    mode: OrderMode,
    side: Side,
    limit_price: Option<f64>,
    quantity: f64,
    percentage: f64,
    leverage: u32,
    available_balance: f64,
    market_price: f64,
    config: OrderEntryConfig,
}

impl OrderEntryGraph {
    pub fn new(
        available_balance: f64,
        market_price: f64,
        config: OrderEntryConfig,
    ) -> Result<Self, TerminalError> {
        Ok(Self {
            mode: OrderMode::Market,
            side: Side::Buy,
            limit_price: None,
            quantity: 0.0,
            percentage: 0.0,
            leverage: 1,
            available_balance: non_negative("available_balance", available_balance)?,
            market_price: positive("market_price", market_price)?,
            config,
        })
    }

    /// Price order-entry maths runs against: the limit price in Limit mode, else the market.
    pub fn reference_price(&self) -> f64 {
        match (self.mode, self.limit_price) {
            (OrderMode::Limit, Some(price)) => price,
            _ => self.market_price,
        }
    }

    pub fn set_percentage(&mut self, percentage: f64) -> Result<(), TerminalError> {
        let percentage = non_negative("percentage", percentage)?;
        if percentage > 100.0 {
            return Err(reject("percentage", format!("{percentage} exceeds 100")));
        }

        let reference = self.reference_price();
        if self.available_balance <= 0.0 || reference <= 0.0 {
            self.pin_to_zero();
            return Ok(());
        }

        self.percentage = percentage;
        self.quantity = self.available_balance * percentage / 100.0 / reference;
        Ok(())
    }

    /// Set the quantity; anything beyond what the balance affords clamps to 100%.
    pub fn set_quantity(&mut self, quantity: f64) -> Result<(), TerminalError> {
        let quantity = non_negative("quantity", quantity)?;
        self.sync_from_quantity(quantity);
        Ok(())
    }

    pub fn set_leverage(&mut self, leverage: u32) -> Result<(), TerminalError> {
        if leverage == 0 || leverage > self.config.max_leverage {
            return Err(reject(
                "leverage",
                format!("{leverage} outside 1..={}", self.config.max_leverage),
            ));
        }
        self.leverage = leverage;
        Ok(())
    }

    /// Switch between Market and Limit pricing.
    ///
    /// Entering Limit mode without a limit price pre-fills it with the market price.
    pub fn set_mode(&mut self, mode: OrderMode) {
        if mode == OrderMode::Limit && self.limit_price.is_none() {
            self.limit_price = Some(self.market_price);
        }
        self.mode = mode;
        self.resync();
    }

    pub fn set_limit_price(&mut self, price: f64) -> Result<(), TerminalError> {
        self.limit_price = Some(positive("limit_price", price)?);
        self.resync();
        Ok(())
    }

    pub fn set_side(&mut self, side: Side) {
        self.side = side;
        self.resync();
    }

    pub fn set_available_balance(&mut self, balance: f64) -> Result<(), TerminalError> {
        self.available_balance = non_negative("available_balance", balance)?;
        self.resync();
        Ok(())
    }

    /// Apply a market price tick.
    pub fn set_market_price(&mut self, price: f64) -> Result<(), TerminalError> {
        self.market_price = positive("market_price", price)?;
        self.resync();
        Ok(())
    }

    pub fn mode(&self) -> OrderMode {
        self.mode
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn limit_price(&self) -> Option<f64> {
        self.limit_price
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    /// Percentage rounded to the slider's integer positions
    pub fn slider_position(&self) -> u8 {
        self.percentage.round().clamp(0.0, 100.0) as u8
    }

    pub fn leverage(&self) -> u32 {
        self.leverage
    }

    pub fn available_balance(&self) -> f64 {
        self.available_balance
    }

    pub fn market_price(&self) -> f64 {
        self.market_price
    }

    pub fn notional(&self) -> f64 {
        self.quantity * self.reference_price()
    }

    pub fn margin(&self) -> f64 {
        self.notional() / self.leverage as f64
    }

    pub fn fee(&self) -> f64 {
        self.notional() * self.config.fee_rate
    }

    /// Margin plus fee, what a buy locks up
    pub fn estimated_cost(&self) -> f64 {
        self.margin() + self.fee()
    }

    /// Notional minus fee, what a sell returns
    pub fn estimated_proceeds(&self) -> f64 {
        self.notional() - self.fee()
    }

    pub fn snapshot(&self) -> OrderEntrySnapshot {
        OrderEntrySnapshot {
            mode: self.mode,
            side: self.side,
            limit_price: self.limit_price,
            reference_price: self.reference_price(),
            quantity: self.quantity,
            percentage: self.percentage,
            slider_position: self.slider_position(),
            leverage: self.leverage,
            available_balance: self.available_balance,
            notional: self.notional(),
            margin: self.margin(),
            fee: self.fee(),
            estimated_total: match self.side {
                Side::Buy => self.estimated_cost(),
                Side::Sell => self.estimated_proceeds(),
            },
        }
    }

    /// Recompute percentage from the kept quantity after a price or balance input changed
    fn resync(&mut self) {
        self.sync_from_quantity(self.quantity);
    }

    fn sync_from_quantity(&mut self, quantity: f64) {
        let reference = self.reference_price();
        if self.available_balance <= 0.0 || reference <= 0.0 {
            self.pin_to_zero();
            return;
        }

        let affordable = self.available_balance / reference;
        self.quantity = quantity.min(affordable);
        self.percentage = (self.quantity * reference / self.available_balance * 100.0).clamp(0.0, 100.0);
    }

    fn pin_to_zero(&mut self) {
        self.quantity = 0.0;
        self.percentage = 0.0;
    }
}

fn reject(field: &'static str, reason: String) -> TerminalError {
    debug!(field, %reason, "order entry input rejected");
    TerminalError::rejected(field, reason)
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, TerminalError> {
    if !value.is_finite() {
        return Err(reject(field, format!("{value} is not a finite number")));
    }
    if value < 0.0 {
        return Err(reject(field, format!("{value} is negative")));
    }
    Ok(value)
}

fn positive(field: &'static str, value: f64) -> Result<f64, TerminalError> {
    let value = non_negative(field, value)?;
    if value == 0.0 {
        return Err(reject(field, "must be greater than zero".to_string()));
    }
    Ok(value)
}
