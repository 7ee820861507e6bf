use async_trait::async_trait;
use chrono::{TimeDelta, TimeZone, Utc};
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tradedesk_core::{
    Direction, ExpiryEvent, InstrumentCatalog, InstrumentClass, ManualClock, OrderMode, Outcome,
    PageSession, Side, TerminalConfig, TerminalError, Ticker24h, TickerFeed, TickerOrigin,
    TickerSource, Timeframe,
};

struct OfflineSource;

#[async_trait]
impl TickerSource for OfflineSource {
    async fn fetch(&self, ticker_symbol: &str) -> Result<Ticker24h, TerminalError> {
        Err(TerminalError::UpstreamUnavailable(format!(
            "{ticker_symbol}: connection refused"
        )))
    }
}

fn live(symbol: &str, last_price: f64) -> Ticker24h {
    Ticker24h {
        symbol: symbol.to_string(),
        last_price,
        change_percent: 0.0,
        high: last_price,
        low: last_price,
        volume: 1.0,
        origin: TickerOrigin::Live,
        received_at: Utc::now(),
    }
}

fn config() -> TerminalConfig {
    TerminalConfig::default()
        .with_refresh(Duration::from_secs(5), Duration::from_secs(2))
        .with_ticker_poll(Duration::from_secs(10))
        .with_trading_balance(10_000.0)
}

#[tokio::test(start_paused = true)]
async fn test_ticker_feed_drives_session() {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 15, 14, 30, 0).unwrap()));
    let mut session = PageSession::new(&config(), clock, "ETH/USDT").unwrap();
    let feed = TickerFeed::new(Arc::new(OfflineSource));
    let (tx, mut rx) = mpsc::channel(4);

    let instrument = session.instrument().clone();
    let mut polling = feed.spawn_polling(instrument, Duration::from_secs(10), tx);

    let ticker = rx.recv().await.unwrap();
    assert_eq!(ticker.origin, TickerOrigin::Fallback);
    assert!(session.apply_ticker(ticker.clone()));

    let snapshot = session.snapshot();
    let shown = snapshot.ticker.as_ref().unwrap();
    assert_eq!(shown.origin, TickerOrigin::Fallback);
    assert_eq!(shown.last_price, snapshot.last_price());
    assert_eq!(snapshot.series.last().unwrap().price, shown.last_price);

    // A late ticker for the previous instrument is ignored after a switch
    session.select_instrument("SOL/USDT").unwrap();
    let late = rx.recv().await.unwrap();
    assert_eq!(late.symbol, "ETH/USDT");
    assert!(!session.apply_ticker(late));
    assert_eq!(session.snapshot().symbol(), "SOL/USDT");

    polling.cancel();
    session.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_failed_poll_keeps_live_price() {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 15, 14, 30, 0).unwrap()));
    let mut session = PageSession::new(&config(), clock, "BTC/USDT").unwrap();
    assert!(session.apply_ticker(live("BTC/USDT", 100_000.0)));

    let feed = TickerFeed::new(Arc::new(OfflineSource));
    let degraded = feed.poll(session.instrument()).await;
    assert_eq!(degraded.origin, TickerOrigin::Fallback);
    assert!(session.apply_ticker(degraded));

    let snapshot = session.snapshot();
    assert_eq!(snapshot.last_price(), 100_000.0);
    assert_eq!(snapshot.ticker.as_ref().unwrap().last_price, 100_000.0);
    assert_eq!(session.order_entry().market_price(), 100_000.0);
}

#[tokio::test(start_paused = true)]
async fn test_order_entry_follows_selection() {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 15, 14, 30, 0).unwrap()));
    let mut session = PageSession::new(&config(), clock, "AAPL").unwrap();
    let last_price = session.snapshot().last_price();

    let order_entry = session.order_entry_mut();
    order_entry.set_percentage(50.0).unwrap();
    assert!((order_entry.quantity() - 5_000.0 / last_price).abs() < 1e-9);

    order_entry.set_side(Side::Sell);
    order_entry.set_mode(OrderMode::Limit);
    assert_eq!(order_entry.limit_price(), Some(last_price));
    assert!(order_entry.set_leverage(0).is_err());
    assert_eq!(order_entry.leverage(), 1);

    session.select_timeframe(Timeframe::OneHour);
    session.select_instrument("NVDA").unwrap();
    let snapshot = session.snapshot();
    assert_eq!(snapshot.timeframe, Timeframe::OneHour);
    assert_eq!(snapshot.series.len(), 24);
    assert_eq!(session.order_entry().market_price(), snapshot.last_price());
    assert_eq!(session.order_entry().side(), Side::Sell);
}

#[tokio::test(start_paused = true)]
async fn test_binary_round_across_tabs() {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 15, 14, 30, 0).unwrap()));
    let mut session = PageSession::new(&config(), clock.clone(), "BTC/USDT").unwrap();
    assert!(session.expiry().is_none());

    for class in InstrumentCatalog::global().classes() {
        session.select_class(class).unwrap();
        assert_eq!(session.instrument().class, class);
        assert_eq!(
            session.expiry().is_some(),
            class == InstrumentClass::BinaryOptions
        );
    }

    // Up on BTC struck at 100000, which then falls
    assert_eq!(session.instrument().symbol, "BTC/USDT:OPT");
    assert!(session.apply_ticker(live("BTC/USDT:OPT", 100_000.0)));
    let up = session.open_binary_position(Direction::Up, 250.0).unwrap();
    assert_eq!(up.order_number, 1);
    assert_eq!(up.strike_price, 100_000.0);
    assert!(session.apply_ticker(live("BTC/USDT:OPT", 99_000.0)));

    // Down on ETH struck at 3500, which then falls
    session.select_instrument("ETH/USDT:OPT").unwrap();
    assert!(session.apply_ticker(live("ETH/USDT:OPT", 3_500.0)));
    let down = session.open_binary_position(Direction::Down, 100.0).unwrap();
    assert_eq!(down.strike_price, 3_500.0);
    assert!(session.apply_ticker(live("ETH/USDT:OPT", 3_490.0)));
    assert!((session.order_entry().available_balance() - 9_650.0).abs() < 1e-9);

    // The round keeps running while another tab is shown
    session.select_class(InstrumentClass::Crypto).unwrap();
    clock.advance(TimeDelta::seconds(61));
    let tick = session.tick_expiry();

    assert!(tick.events.contains(&ExpiryEvent::Settled { order_number: 1 }));
    assert_eq!(session.settlements().len(), 2);
    assert!(session.open_binaries().is_empty());

    let outcomes: Vec<_> = tick
        .settlements
        .iter()
        .map(|settlement| (settlement.settlement_price, settlement.outcome))
        .collect();
    assert_eq!(outcomes, vec![(99_000.0, Outcome::Loss), (3_490.0, Outcome::Win)]);

    // The losing stake is gone, the winner returns stake plus 85%
    assert!((session.order_entry().available_balance() - 9_835.0).abs() < 1e-9);
}
