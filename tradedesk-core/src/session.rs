//! Per-page trading session
//!
//! A [`PageSession`] owns everything one open trading page needs: the selected
//! instrument and timeframe, the latest [`MarketSnapshot`], the refresh tasks that
//! regenerate it, the order-entry form, the watchlist and (for binary options) the
//! expiry round.
//!
//! Snapshots are published whole through a `watch` channel. Every selection change bumps
//! the session generation before publishing, and refresh tasks only publish over a
//! snapshot of their own generation, so a cancelled task can never overwrite data for
//! the new selection.
//!
//! The book refresh also steps the mark price, so a page keeps moving without a live
//! ticker. The session remembers the latest price seen per symbol; binary positions
//! settle against it and revisited instruments continue from it.

use crate::{
    catalog::{InstrumentCatalog, InstrumentClass, InstrumentInfo, InstrumentSeed},
    config::TerminalConfig,
    error::TerminalError,
    expiry::{
        BinaryPosition, Clock, Direction, ExpiryConfig, ExpiryEvent, ExpiryTimer, Settlement,
    },
    order_entry::OrderEntryGraph,
    schedule::{RefreshHandle, RefreshScheduler},
    synth::{OrderBookSynthesizer, drift, series, trades},
    ticker::{Ticker24h, TickerOrigin},
    types::{OrderBookSnapshot, PricePoint, SyntheticTrade, Timeframe},
    watchlist::WatchlistStore,
};
use chrono::{DateTime, Utc};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Everything rendered for the selected instrument, generated together
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    /// Selection generation this snapshot belongs to
    pub generation: u64,
    pub seed: InstrumentSeed,
    pub timeframe: Timeframe,
    pub series: Vec<PricePoint>,
    pub book: OrderBookSnapshot,
    pub trades: Vec<SyntheticTrade>,
    /// Latest ticker for the instrument, if one arrived this generation
    pub ticker: Option<Ticker24h>,
    pub generated_at: DateTime<Utc>,
}

impl MarketSnapshot {
    fn synthesize(
        generation: u64,
        seed: InstrumentSeed,
        timeframe: Timeframe,
        synthesizer: &OrderBookSynthesizer,
        tape_len: usize,
    ) -> Self {
        let series = series::generate(&seed, timeframe);
        let (book, trades) = book_and_tape(&seed, synthesizer, tape_len);
        Self {
            generation,
            seed,
            timeframe,
            series,
            book,
            trades,
            ticker: None,
            generated_at: Utc::now(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.seed.symbol
    }

    pub fn last_price(&self) -> f64 {
        self.seed.last_price()
    }

    fn with_series(&self) -> Self {
        Self {
            series: series::generate(&self.seed, self.timeframe),
            generated_at: Utc::now(),
            ..self.clone()
        }
    }

    fn with_book(&self, synthesizer: &OrderBookSynthesizer, tape_len: usize) -> Self {
        let seed = drift::step(&self.seed);
        let (book, trades) = book_and_tape(&seed, synthesizer, tape_len);
        Self {
            seed,
            book,
            trades,
            generated_at: Utc::now(),
            ..self.clone()
        }
    }
}

/// Book and tape centre on the last traded price so they agree with the chart's end.
fn book_and_tape(
    seed: &InstrumentSeed,
    synthesizer: &OrderBookSynthesizer,
    tape_len: usize,
) -> (OrderBookSnapshot, Vec<SyntheticTrade>) {
    let centred = seed.repriced(seed.last_price());
    (synthesizer.generate(&centred), trades::generate(seed, tape_len))
}

/// Seed whose last price is `last_price` after `change_percent` is applied.
fn reseeded(seed: &InstrumentSeed, last_price: f64, change_percent: f64) -> Option<InstrumentSeed> {
    let growth = 1.0 + change_percent / 100.0;
    if !last_price.is_finite() || last_price <= 0.0 || !growth.is_finite() {
        return None;
    }

    let base_price = if growth > 0.0 { last_price / growth } else { last_price };
    Some(InstrumentSeed {
        change_percent,
        ..seed.repriced(base_price)
    })
}

/// Replace the published snapshot with `regenerate(current)`, unless the session has
/// moved on to another generation.
fn publish_refresh<F>(
    sender: &watch::Sender<Arc<MarketSnapshot>>,
    generation: u64,
    regenerate: F,
) -> bool
where
    F: FnOnce(&MarketSnapshot) -> MarketSnapshot,
{
    sender.send_if_modified(|current| {
        if current.generation != generation {
            debug!(
                generation,
                current = current.generation,
                "dropping stale refresh"
            );
            return false;
        }
        let next = regenerate(&**current);
        *current = Arc::new(next);
        true
    })
}

/// Binary contract waiting for its round to settle
#[derive(Debug, Clone, PartialEq)]
pub struct OpenBinary {
    pub symbol: String,
    pub position: BinaryPosition,
}

/// Result of sampling the expiry round
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpiryTick {
    pub events: Vec<ExpiryEvent>,
    pub settlements: Vec<Settlement>,
}

pub struct PageSession {
    catalog: &'static InstrumentCatalog,
    synthesizer: OrderBookSynthesizer,
    trade_tape_len: usize,
    series_refresh: Duration,
    book_refresh: Duration,
    expiry_config: ExpiryConfig,
    payout_ratio: f64,
    clock: Arc<dyn Clock>,

    instrument: &'static InstrumentInfo,
    generation: u64,
    sender: Arc<watch::Sender<Arc<MarketSnapshot>>>,
    series_handle: RefreshHandle,
    book_handle: RefreshHandle,

    order_entry: OrderEntryGraph,
    watchlist: WatchlistStore,
    expiry: Option<ExpiryTimer>,
    open_binaries: Vec<OpenBinary>,
    settlements: Vec<Settlement>,
    latest_prices: HashMap<String, f64>,
}

impl std::fmt::Debug for PageSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageSession")
            .field("symbol", &self.instrument.symbol)
            .field("generation", &self.generation)
            .field("order_entry", &self.order_entry)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

impl PageSession {
    /// Open a session on `symbol` and start its refresh tasks.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        config: &TerminalConfig,
        clock: Arc<dyn Clock>,
        symbol: &str,
    ) -> Result<Self, TerminalError> {
        let catalog = InstrumentCatalog::global();
        let instrument = catalog.get(symbol)?;
        let synthesizer = config.book_synthesizer()?;
        let expiry_config = config.expiry()?;
        let seed = instrument.seed();
        let order_entry = OrderEntryGraph::new(
            config.trading_balance,
            seed.last_price(),
            config.order_entry(),
        )?;

        let generation = 1;
        let snapshot = MarketSnapshot::synthesize(
            generation,
            seed,
            Timeframe::default(),
            &synthesizer,
            config.trade_tape_len,
        );
        let (sender, _) = watch::channel(Arc::new(snapshot));

        let mut session = Self {
            catalog,
            synthesizer,
            trade_tape_len: config.trade_tape_len,
            series_refresh: config.series_refresh,
            book_refresh: config.book_refresh,
            expiry_config,
            payout_ratio: config.binary_payout_ratio,
            clock,
            instrument,
            generation,
            sender: Arc::new(sender),
            series_handle: RefreshHandle::idle("series"),
            book_handle: RefreshHandle::idle("book"),
            order_entry,
            watchlist: WatchlistStore::new(),
            expiry: None,
            open_binaries: Vec::new(),
            settlements: Vec::new(),
            latest_prices: HashMap::new(),
        };
        session.sync_expiry();
        session.start_refresh();

        info!(symbol, "page session opened");
        Ok(session)
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<MarketSnapshot>> {
        self.sender.subscribe()
    }

    pub fn snapshot(&self) -> Arc<MarketSnapshot> {
        Arc::clone(&self.sender.borrow())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn instrument(&self) -> &'static InstrumentInfo {
        self.instrument
    }

    pub fn timeframe(&self) -> Timeframe {
        self.sender.borrow().timeframe
    }

    /// Switch to another instrument, keeping the timeframe.
    ///
    /// A previously seen instrument continues from its latest price. Unknown symbols are
    /// rejected and leave the session untouched.
    pub fn select_instrument(&mut self, symbol: &str) -> Result<(), TerminalError> {
        let instrument = self.catalog.get(symbol)?;
        let seed = instrument.seed();
        let seed = self
            .latest_prices
            .get(symbol)
            .and_then(|last_price| reseeded(&seed, *last_price, seed.change_percent))
            .unwrap_or(seed);
        self.order_entry.set_market_price(seed.last_price())?;

        let timeframe = self.timeframe();
        self.instrument = instrument;
        self.switch(seed, timeframe);
        self.sync_expiry();

        info!(symbol, generation = self.generation, "instrument selected");
        Ok(())
    }

    /// Select the first instrument of `class`.
    pub fn select_class(&mut self, class: InstrumentClass) -> Result<(), TerminalError> {
        let instrument = self.catalog.first_of(class).ok_or_else(|| {
            TerminalError::InvalidArgument(format!("no instruments for class {class}"))
        })?;
        self.select_instrument(instrument.symbol)
    }

    pub fn select_timeframe(&mut self, timeframe: Timeframe) {
        let seed = self.sender.borrow().seed.clone();
        self.switch(seed, timeframe);
        debug!(%timeframe, generation = self.generation, "timeframe selected");
    }

    /// Reseed the selected instrument from a live ticker so charts end at its last price.
    ///
    /// A fallback ticker never moves the price: its figures are rebuilt from the seed
    /// currently shown. Returns false when the ticker is for another instrument or unusable.
    pub fn apply_ticker(&mut self, ticker: Ticker24h) -> bool {
        if ticker.symbol != self.instrument.symbol {
            debug!(
                ticker = %ticker.symbol,
                selected = self.instrument.symbol,
                "ignoring ticker for unselected instrument"
            );
            return false;
        }

        if ticker.origin == TickerOrigin::Fallback {
            let received_at = ticker.received_at;
            self.sender.send_modify(|current| {
                let ticker = Ticker24h {
                    received_at,
                    ..Ticker24h::fallback(&current.seed)
                };
                *current = Arc::new(MarketSnapshot {
                    ticker: Some(ticker),
                    ..(**current).clone()
                });
            });
            return true;
        }

        let current = self.snapshot();
        let Some(seed) = reseeded(&current.seed, ticker.last_price, ticker.change_percent) else {
            warn!(symbol = %ticker.symbol, last_price = ticker.last_price, "ignoring unusable ticker");
            return false;
        };
        if let Err(error) = self.order_entry.set_market_price(seed.last_price()) {
            warn!(%error, "ticker price rejected by order entry");
            return false;
        }

        let mut snapshot = MarketSnapshot::synthesize(
            self.generation,
            seed,
            current.timeframe,
            &self.synthesizer,
            self.trade_tape_len,
        );
        snapshot.ticker = Some(ticker);
        self.latest_prices
            .insert(self.instrument.symbol.to_string(), snapshot.last_price());
        self.sender.send_replace(Arc::new(snapshot));
        true
    }

    pub fn order_entry(&self) -> &OrderEntryGraph {
        &self.order_entry
    }

    pub fn order_entry_mut(&mut self) -> &mut OrderEntryGraph {
        &mut self.order_entry
    }

    pub fn watchlist(&self) -> &WatchlistStore {
        &self.watchlist
    }

    /// Toggle the selected instrument on the watchlist.
    pub fn toggle_watch(&mut self) -> bool {
        self.watchlist.toggle(self.instrument.symbol)
    }

    /// Expiry round of the selected binary option, if one is selected
    pub fn expiry(&self) -> Option<&ExpiryTimer> {
        match self.instrument.class {
            InstrumentClass::BinaryOptions => self.expiry.as_ref(),
            _ => None,
        }
    }

    pub fn open_binaries(&self) -> &[OpenBinary] {
        &self.open_binaries
    }

    pub fn settlements(&self) -> &[Settlement] {
        &self.settlements
    }

    /// Stake on the selected binary option's open round, struck at the last price.
    pub fn open_binary_position(
        &mut self,
        direction: Direction,
        stake: f64,
    ) -> Result<BinaryPosition, TerminalError> {
        let strike_price = self.track_published_price();
        let timer = self.expiry().ok_or_else(|| {
            TerminalError::InvalidArgument(format!(
                "{} has no expiry rounds",
                self.instrument.symbol
            ))
        })?;

        let balance = self.order_entry.available_balance();
        if stake > balance {
            return Err(TerminalError::rejected(
                "stake",
                format!("{stake} exceeds available balance {balance}"),
            ));
        }

        let position = timer.open_position(direction, stake, strike_price, self.payout_ratio)?;
        self.order_entry.set_available_balance(balance - stake)?;

        info!(
            symbol = self.instrument.symbol,
            order_number = position.order_number,
            ?direction,
            stake,
            strike_price,
            "binary position opened"
        );
        self.open_binaries.push(OpenBinary {
            symbol: self.instrument.symbol.to_string(),
            position: position.clone(),
        });
        Ok(position)
    }

    /// Sample the published price and the expiry clock, settling positions whose round
    /// ended.
    ///
    /// Keeps the order-entry market price on the moving mark price, so call it every frame.
    pub fn tick_expiry(&mut self) -> ExpiryTick {
        self.track_published_price();
        let Some(timer) = self.expiry.as_mut() else {
            return ExpiryTick::default();
        };

        let events = timer.tick();
        let mut settlements = Vec::new();

        for event in &events {
            let ExpiryEvent::Settled { order_number } = *event else {
                continue;
            };

            let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.open_binaries)
                .into_iter()
                .partition(|open| open.position.order_number <= order_number);
            self.open_binaries = pending;

            for open in due {
                let price = self
                    .latest_prices
                    .get(&open.symbol)
                    .copied()
                    .unwrap_or(open.position.strike_price);
                let settlement = open.position.settle(price);
                info!(
                    symbol = %open.symbol,
                    order_number = settlement.order_number,
                    outcome = ?settlement.outcome,
                    pnl = settlement.pnl,
                    "binary position settled"
                );
                settlements.push(settlement);
            }
        }

        if !settlements.is_empty() {
            let payout: f64 = settlements.iter().map(|settlement| settlement.payout).sum();
            let balance = self.order_entry.available_balance() + payout;
            if let Err(error) = self.order_entry.set_available_balance(balance) {
                warn!(%error, "settlement payout rejected by order entry");
            }
            self.settlements.extend(settlements.iter().cloned());
        }

        ExpiryTick {
            events,
            settlements,
        }
    }

    /// Stop refreshing. The last snapshot stays readable.
    pub fn shutdown(&mut self) {
        self.series_handle.cancel();
        self.book_handle.cancel();
        info!(symbol = self.instrument.symbol, "page session closed");
    }

    fn switch(&mut self, seed: InstrumentSeed, timeframe: Timeframe) {
        self.series_handle.cancel();
        self.book_handle.cancel();

        self.generation += 1;
        let snapshot = MarketSnapshot::synthesize(
            self.generation,
            seed,
            timeframe,
            &self.synthesizer,
            self.trade_tape_len,
        );
        self.sender.send_replace(Arc::new(snapshot));

        self.start_refresh();
    }

    fn start_refresh(&mut self) {
        let generation = self.generation;

        let sender = Arc::clone(&self.sender);
        self.series_handle =
            RefreshScheduler::start("series", self.series_refresh, move || {
                publish_refresh(&sender, generation, MarketSnapshot::with_series);
            });

        let sender = Arc::clone(&self.sender);
        let synthesizer = self.synthesizer;
        let tape_len = self.trade_tape_len;
        self.book_handle = RefreshScheduler::start("book", self.book_refresh, move || {
            publish_refresh(&sender, generation, |current| {
                current.with_book(&synthesizer, tape_len)
            });
        });
    }

    /// Binary options share one round clock, created on first use.
    fn sync_expiry(&mut self) {
        if self.instrument.class == InstrumentClass::BinaryOptions && self.expiry.is_none() {
            self.expiry = Some(ExpiryTimer::new(
                self.expiry_config,
                Arc::clone(&self.clock),
            ));
        }
    }

    /// Record the published last price of the selected instrument and follow it in
    /// order entry.
    fn track_published_price(&mut self) -> f64 {
        let snapshot = self.snapshot();
        let price = snapshot.last_price();
        if snapshot.symbol() != self.instrument.symbol {
            return price;
        }

        self.latest_prices.insert(snapshot.symbol().to_string(), price);
        if self.order_entry.market_price() != price {
            if let Err(error) = self.order_entry.set_market_price(price) {
                warn!(%error, price, "mark price rejected by order entry");
            }
        }
        price
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        self.series_handle.cancel();
        self.book_handle.cancel();
    }
}
