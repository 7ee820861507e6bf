use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, List, ListItem, Paragraph, Sparkline, Tabs},
};
use rust_decimal::prelude::ToPrimitive;
use std::{fs::File, io, sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tradedesk_core::{
    BackendClient, HttpTickerSource, InstrumentCatalog, InstrumentClass, MarketSnapshot,
    OrderBookLevel, OrderMode, PageSession, RefreshHandle, RoundPhase, Side, SystemClock,
    TerminalConfig, TerminalError, Ticker24h, TickerFeed, TickerOrigin,
    expiry::Direction as BinaryDirection,
};

const LEVERAGE_STEPS: [u32; 8] = [1, 2, 5, 10, 20, 50, 100, 125];
const PERCENTAGE_STEP: f64 = 5.0;
const BINARY_STAKE: f64 = 100.0;
const QUOTE_CURRENCY: &str = "USDT";

const BG: Color = Color::Rgb(15, 15, 25);
const MUTED: Color = Color::Rgb(128, 128, 150);
const GOLD: Color = Color::Rgb(255, 215, 0);
const GREEN: Color = Color::Rgb(0, 255, 127);
const RED: Color = Color::Rgb(255, 69, 58);
const BLUE: Color = Color::Rgb(100, 149, 237);

/// Result of the background balance fetch
enum BackendUpdate {
    Balance(f64),
    Failed(TerminalError),
}

struct App {
    session: PageSession,
    feed: TickerFeed,
    ticker_poll: Duration,
    ticker_tx: mpsc::Sender<Ticker24h>,
    ticker_rx: mpsc::Receiver<Ticker24h>,
    polling: RefreshHandle,
    backend_rx: Option<mpsc::Receiver<BackendUpdate>>,
    status: String,
}

impl App {
    fn new(session: PageSession, feed: TickerFeed, ticker_poll: Duration) -> Self {
        let (ticker_tx, ticker_rx) = mpsc::channel(16);
        let mut app = Self {
            session,
            feed,
            ticker_poll,
            ticker_tx,
            ticker_rx,
            polling: RefreshHandle::idle("ticker"),
            backend_rx: None,
            status: String::new(),
        };
        app.restart_polling();
        app
    }

    fn restart_polling(&mut self) {
        self.polling.cancel();
        self.polling = self.feed.spawn_polling(
            self.session.instrument().clone(),
            self.ticker_poll,
            self.ticker_tx.clone(),
        );
    }

    /// Apply tickers and backend answers that arrived since the last frame.
    fn drain_updates(&mut self) {
        while let Ok(ticker) = self.ticker_rx.try_recv() {
            self.session.apply_ticker(ticker);
        }

        let Some(backend_rx) = self.backend_rx.as_mut() else {
            return;
        };
        while let Ok(update) = backend_rx.try_recv() {
            match update {
                BackendUpdate::Balance(balance) => {
                    if let Err(error) = self.session.order_entry_mut().set_available_balance(balance)
                    {
                        warn!(%error, "backend balance rejected");
                    }
                }
                BackendUpdate::Failed(error) => match error.login_redirect() {
                    Some(login_path) => {
                        self.status = format!("Session expired, log in again at {login_path}");
                    }
                    None => warn!(%error, "balance fetch failed"),
                },
            }
        }
    }

    fn on_tick(&mut self) {
        let tick = self.session.tick_expiry();
        for settlement in tick.settlements {
            self.status = format!(
                "Round #{} settled: {:?}, pnl {:+.2}",
                settlement.order_number, settlement.outcome, settlement.pnl
            );
        }
    }

    /// Returns false when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Tab => {
                let class = self.session.instrument().class.next();
                let result = self.session.select_class(class);
                self.after_selection(result);
            }
            KeyCode::Up => self.step_instrument(-1),
            KeyCode::Down => self.step_instrument(1),
            KeyCode::Char('t') => {
                let timeframe = self.session.timeframe().next();
                self.session.select_timeframe(timeframe);
            }
            KeyCode::Char('f') => {
                self.session.toggle_watch();
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.nudge_percentage(PERCENTAGE_STEP),
            KeyCode::Char('-') => self.nudge_percentage(-PERCENTAGE_STEP),
            KeyCode::Char('l') => self.cycle_leverage(),
            KeyCode::Char('m') => {
                let order_entry = self.session.order_entry_mut();
                let mode = match order_entry.mode() {
                    OrderMode::Market => OrderMode::Limit,
                    OrderMode::Limit => OrderMode::Market,
                };
                order_entry.set_mode(mode);
            }
            KeyCode::Char('s') => {
                let order_entry = self.session.order_entry_mut();
                let side = order_entry.side().opposite();
                order_entry.set_side(side);
            }
            KeyCode::Char('u') => self.place_binary(BinaryDirection::Up),
            KeyCode::Char('d') => self.place_binary(BinaryDirection::Down),
            _ => {}
        }
        true
    }

    fn step_instrument(&mut self, delta: isize) {
        let current = self.session.instrument();
        let instruments: Vec<_> = InstrumentCatalog::global().by_class(current.class).collect();
        let Some(position) = instruments.iter().position(|info| info.symbol == current.symbol)
        else {
            return;
        };

        let next = (position as isize + delta).rem_euclid(instruments.len() as isize) as usize;
        let result = self.session.select_instrument(instruments[next].symbol);
        self.after_selection(result);
    }

    fn after_selection(&mut self, result: Result<(), TerminalError>) {
        match result {
            Ok(()) => self.restart_polling(),
            Err(error) => self.status = error.to_string(),
        }
    }

    fn nudge_percentage(&mut self, delta: f64) {
        let order_entry = self.session.order_entry_mut();
        let percentage = (order_entry.percentage() + delta).clamp(0.0, 100.0);
        if let Err(error) = order_entry.set_percentage(percentage) {
            self.status = error.to_string();
        }
    }

    fn cycle_leverage(&mut self) {
        let order_entry = self.session.order_entry_mut();
        let current = order_entry.leverage();
        let next = LEVERAGE_STEPS
            .into_iter()
            .find(|step| *step > current)
            .unwrap_or(1);
        if let Err(error) = order_entry
            .set_leverage(next)
            .or_else(|_| order_entry.set_leverage(1))
        {
            self.status = error.to_string();
        }
    }

    fn place_binary(&mut self, direction: BinaryDirection) {
        self.status = match self.session.open_binary_position(direction, BINARY_STAKE) {
            Ok(position) => format!(
                "Round #{}: {:?} {:.2} struck at {}",
                position.order_number, position.direction, position.stake, position.strike_price
            ),
            Err(error) => error.to_string(),
        };
    }

    fn shutdown(&mut self) {
        self.polling.cancel();
        self.session.shutdown();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let config = TerminalConfig::from_env();
    let first = InstrumentCatalog::global()
        .first_of(InstrumentClass::Crypto)
        .ok_or("instrument catalog is empty")?;

    let session = PageSession::new(&config, Arc::new(SystemClock), first.symbol)?;
    let source = HttpTickerSource::new(&config.ticker_base_url, config.request_timeout)?;
    let mut app = App::new(session, TickerFeed::new(Arc::new(source)), config.ticker_poll);
    if config.api_token.is_some() {
        app.backend_rx = Some(spawn_balance_fetch(BackendClient::new(&config)?));
    }
    info!(symbol = first.symbol, "tradedesk started");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run TUI
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.shutdown();
    info!("tradedesk stopped");
    res?;

    Ok(())
}

/// Log to a file; stdout belongs to the terminal UI.
fn init_logging() -> io::Result<()> {
    let path = std::env::var("TRADEDESK_LOG").unwrap_or_else(|_| "tradedesk.log".to_string());
    let file = File::create(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn spawn_balance_fetch(client: BackendClient) -> mpsc::Receiver<BackendUpdate> {
    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(async move {
        let update = match client.available(QUOTE_CURRENCY).await {
            Ok(balance) => match balance.to_f64() {
                Some(balance) => BackendUpdate::Balance(balance),
                None => BackendUpdate::Failed(TerminalError::UpstreamUnavailable(format!(
                    "balance {balance} out of range"
                ))),
            },
            Err(error) => BackendUpdate::Failed(error),
        };
        let _ = tx.send(update).await;
    });
    rx
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = std::time::Instant::now();

    loop {
        app.drain_updates();
        let snapshot = app.session.snapshot();

        terminal.draw(|f| ui(f, app, &snapshot))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && !app.handle_key(key.code) {
                    return Ok(());
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = std::time::Instant::now();
        }
    }
}

fn ui(f: &mut Frame, app: &App, snapshot: &MarketSnapshot) {
    let size = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(size);

    render_header(f, chunks[0], app, snapshot);
    render_class_tabs(f, chunks[1], app);

    // Chart and order form left, book and tape right
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[2]);

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(10)])
        .split(main_chunks[0]);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(main_chunks[1]);

    render_chart(f, left_chunks[0], snapshot);
    if app.session.expiry().is_some() {
        let form_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(left_chunks[1]);
        render_order_form(f, form_chunks[0], app, snapshot);
        render_expiry(f, form_chunks[1], app);
    } else {
        render_order_form(f, left_chunks[1], app, snapshot);
    }

    render_book(f, right_chunks[0], snapshot);
    render_trades(f, right_chunks[1], snapshot);
    render_footer(f, chunks[3], app);
}

fn panel(title: &str, accent: Color) -> Block<'static> {
    Block::default()
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(accent))
        .style(Style::default().bg(BG))
}

fn price_text(price: f64, decimal_places: u32) -> String {
    format!("{:.*}", decimal_places as usize, price)
}

fn change_color(change: f64) -> Color {
    if change >= 0.0 { GREEN } else { RED }
}

fn render_header(f: &mut Frame, area: Rect, app: &App, snapshot: &MarketSnapshot) {
    let seed = &snapshot.seed;
    let instrument = app.session.instrument();
    let watched = if app.session.watchlist().contains(instrument.symbol) {
        "★"
    } else {
        "☆"
    };
    let (origin, origin_color) = match snapshot.ticker.as_ref().map(|ticker| ticker.origin) {
        Some(TickerOrigin::Live) => ("LIVE", GREEN),
        Some(TickerOrigin::Fallback) | None => ("SIM", MUTED),
    };

    let line = Line::from(vec![
        Span::styled(format!(" {watched} "), Style::default().fg(GOLD)),
        Span::styled(
            format!("{} {} ", instrument.icon, seed.symbol),
            Style::default().fg(GOLD).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{}  ", seed.display_name), Style::default().fg(MUTED)),
        Span::styled(
            format!("{} {}  ", price_text(snapshot.last_price(), seed.decimal_places), seed.unit),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{:+.2}%  ", seed.change_percent),
            Style::default().fg(change_color(seed.change_percent)),
        ),
        Span::styled(format!("[{origin}]  "), Style::default().fg(origin_color)),
        Span::styled(
            format!("⏱ {}", snapshot.generated_at.format("%H:%M:%S")),
            Style::default().fg(BLUE),
        ),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Rgb(138, 43, 226)))
        .style(Style::default().bg(Color::Rgb(18, 18, 28)));

    f.render_widget(
        Paragraph::new(line).block(block).alignment(Alignment::Center),
        area,
    );
}

fn render_class_tabs(f: &mut Frame, area: Rect, app: &App) {
    let classes = InstrumentCatalog::global().classes();
    let selected = classes
        .iter()
        .position(|class| *class == app.session.instrument().class)
        .unwrap_or(0);

    let tabs = Tabs::new(classes.iter().map(|class| class.label()).collect::<Vec<_>>())
        .select(selected)
        .style(Style::default().fg(MUTED))
        .highlight_style(Style::default().fg(GOLD).add_modifier(Modifier::BOLD))
        .block(panel("Markets [Tab]", BLUE));

    f.render_widget(tabs, area);
}

fn render_chart(f: &mut Frame, area: Rect, snapshot: &MarketSnapshot) {
    let block = panel(
        &format!("{} · {} [t]", snapshot.symbol(), snapshot.timeframe),
        BLUE,
    );
    let inner = block.inner(area);
    f.render_widget(block, area);

    let (Some(first), Some(last)) = (snapshot.series.first(), snapshot.series.last()) else {
        return;
    };

    let low = snapshot
        .series
        .iter()
        .map(|point| point.price)
        .fold(f64::INFINITY, f64::min);
    let high = snapshot
        .series
        .iter()
        .map(|point| point.price)
        .fold(f64::NEG_INFINITY, f64::max);
    let range = (high - low).max(f64::EPSILON);

    // Offset so the lowest point still draws a bar
    let data: Vec<u64> = snapshot
        .series
        .iter()
        .map(|point| ((point.price - low) / range * 100.0) as u64 + 1)
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let dp = snapshot.seed.decimal_places;
    let summary = Line::from(vec![
        Span::styled(
            format!("{} → {}  ", first.time_label, last.time_label),
            Style::default().fg(MUTED),
        ),
        Span::styled(format!("H {}  ", price_text(high, dp)), Style::default().fg(GREEN)),
        Span::styled(format!("L {}", price_text(low, dp)), Style::default().fg(RED)),
    ]);
    f.render_widget(Paragraph::new(summary), chunks[0]);

    let sparkline = Sparkline::default()
        .data(&data)
        .max(101)
        .style(Style::default().fg(change_color(snapshot.seed.change_percent)));
    f.render_widget(sparkline, chunks[1]);
}

fn book_line(level: &OrderBookLevel, max_amount: f64, dp: u32, color: Color) -> Line<'static> {
    let width = if max_amount > 0.0 {
        (level.amount / max_amount * 12.0).ceil() as usize
    } else {
        0
    };
    Line::from(vec![
        Span::styled(
            format!("{:>14}", price_text(level.price, dp)),
            Style::default().fg(color),
        ),
        Span::styled(format!("{:>12.4} ", level.amount), Style::default().fg(Color::White)),
        Span::styled("█".repeat(width), Style::default().fg(color)),
    ])
}

fn render_book(f: &mut Frame, area: Rect, snapshot: &MarketSnapshot) {
    let block = panel("Order Book", Color::Rgb(240, 185, 11));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let book = &snapshot.book;
    let dp = snapshot.seed.decimal_places;
    let max_amount = book.max_amount();
    let rows = (inner.height.saturating_sub(1) / 2) as usize;

    let mut lines: Vec<Line> = book
        .asks
        .iter()
        .take(rows)
        .rev()
        .map(|level| book_line(level, max_amount, dp, RED))
        .collect();

    let spread = match (book.spread(), book.spread_percentage()) {
        (Some(spread), Some(percentage)) => {
            format!("spread {} ({:.3}%)", price_text(spread, dp), percentage)
        }
        _ => "spread -".to_string(),
    };
    lines.push(Line::from(Span::styled(
        format!("{spread:^40}"),
        Style::default().fg(GOLD),
    )));

    lines.extend(
        book.bids
            .iter()
            .take(rows)
            .map(|level| book_line(level, max_amount, dp, GREEN)),
    );

    f.render_widget(Paragraph::new(lines), inner);
}

fn render_trades(f: &mut Frame, area: Rect, snapshot: &MarketSnapshot) {
    let dp = snapshot.seed.decimal_places;
    let items: Vec<ListItem> = snapshot
        .trades
        .iter()
        .map(|trade| {
            let color = if trade.side.is_buy() { GREEN } else { RED };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", trade.time_label), Style::default().fg(MUTED)),
                Span::styled(
                    format!("{:>14} ", price_text(trade.price, dp)),
                    Style::default().fg(color),
                ),
                Span::styled(format!("{:>10.4}", trade.amount), Style::default().fg(Color::White)),
            ]))
        })
        .collect();

    f.render_widget(List::new(items).block(panel("Trades", Color::Rgb(255, 105, 180))), area);
}

fn render_order_form(f: &mut Frame, area: Rect, app: &App, snapshot: &MarketSnapshot) {
    let order = app.session.order_entry().snapshot();
    let dp = snapshot.seed.decimal_places;
    let side_color = if order.side == Side::Buy { GREEN } else { RED };

    let block = panel("Order [m]ode [s]ide [l]everage [+/-]", side_color);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let label = Style::default().fg(MUTED);
    let value = Style::default().fg(Color::White);
    let total_label = match order.side {
        Side::Buy => "Cost",
        Side::Sell => "Proceeds",
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{} {} ", order.side, order.mode.as_str()),
                Style::default().fg(side_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled("@ ", label),
            Span::styled(price_text(order.reference_price, dp), value),
            Span::styled(format!("  {}x", order.leverage), Style::default().fg(GOLD)),
        ]),
        Line::from(vec![
            Span::styled("Qty ", label),
            Span::styled(format!("{:.6}", order.quantity), value),
            Span::styled("  Avail ", label),
            Span::styled(format!("{:.2}", order.available_balance), value),
        ]),
        Line::from(vec![
            Span::styled("Notional ", label),
            Span::styled(format!("{:.2}", order.notional), value),
            Span::styled("  Margin ", label),
            Span::styled(format!("{:.2}", order.margin), value),
        ]),
        Line::from(vec![
            Span::styled("Fee ", label),
            Span::styled(format!("{:.2}", order.fee), value),
            Span::styled(format!("  {total_label} "), label),
            Span::styled(
                format!("{:.2}", order.estimated_total),
                Style::default().fg(side_color).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];
    f.render_widget(Paragraph::new(lines), chunks[0]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(side_color).bg(Color::Rgb(30, 30, 40)))
        .percent(u16::from(order.slider_position.min(100)))
        .label(format!("{:.0}%", order.percentage));
    f.render_widget(gauge, chunks[1]);
}

fn render_expiry(f: &mut Frame, area: Rect, app: &App) {
    let Some(timer) = app.session.expiry() else {
        return;
    };

    let (phase, phase_color) = match timer.phase() {
        RoundPhase::Open => ("OPEN", GREEN),
        RoundPhase::Locked => ("LOCKED", RED),
        RoundPhase::Settled => ("SETTLED", GOLD),
    };

    let block = panel("Expiry [u]p [d]own", phase_color);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let round = timer.round();
    let open: f64 = app
        .session
        .open_binaries()
        .iter()
        .map(|open| open.position.stake)
        .sum();
    let last = app.session.settlements().last().map_or_else(
        || "-".to_string(),
        |settlement| format!("#{} {:?} {:+.2}", settlement.order_number, settlement.outcome, settlement.pnl),
    );

    let lines = vec![
        Line::from(vec![
            Span::styled(format!("Round #{} ", round.order_number), Style::default().fg(Color::White)),
            Span::styled(phase, Style::default().fg(phase_color).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![
            Span::styled("Settles in ", Style::default().fg(MUTED)),
            Span::styled(
                round.remaining.to_string(),
                Style::default().fg(GOLD).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Staked ", Style::default().fg(MUTED)),
            Span::styled(format!("{open:.2}"), Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::styled("Last ", Style::default().fg(MUTED)),
            Span::styled(last, Style::default().fg(Color::White)),
        ]),
    ];
    f.render_widget(Paragraph::new(lines), chunks[0]);

    let duration = timer.config().round_duration().num_seconds().max(1);
    let percent = (round.remaining.total_seconds() * 100 / duration).clamp(0, 100) as u16;
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(phase_color).bg(Color::Rgb(30, 30, 40)))
        .percent(percent)
        .label(round.remaining.to_string());
    f.render_widget(gauge, chunks[1]);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let mut watched: Vec<String> = app.session.watchlist().all().into_iter().collect();
    watched.sort();
    let watched = if watched.is_empty() {
        "-".to_string()
    } else {
        watched.join(" ")
    };

    let line = Line::from(vec![
        Span::styled(" ★ ", Style::default().fg(GOLD)),
        Span::styled(format!("{watched}  "), Style::default().fg(Color::White)),
        Span::styled(format!("{}  ", app.status), Style::default().fg(Color::Rgb(255, 150, 200))),
        Span::styled(
            "[↑↓] Instrument [f] Favourite [Q] Quit",
            Style::default().fg(Color::Rgb(128, 128, 128)),
        ),
    ]);

    f.render_widget(
        Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(MUTED))
                .style(Style::default().bg(BG)),
        ),
        area,
    );
}
