//! Countdown state machine for fixed-duration binary-option rounds.
//!
//! Phases cycle `Open -> Locked -> Settled -> Open` for the life of the page. The remaining
//! time is always derived from `settlement_time - now`, never from counting ticks, so a
//! host that throttles timers (backgrounded tab) resumes on the correct second.

use crate::error::TerminalError;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::{
    sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    },
    time::Duration,
};
use tracing::{debug, info};

/// Default round length (1 minute)
pub const DEFAULT_ROUND_DURATION: Duration = Duration::from_secs(60);

/// Default lead time before settlement at which entries close
pub const DEFAULT_CUTOFF_OFFSET: Duration = Duration::from_secs(30);

/// Source of wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to, for replays and tests
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    pub fn set(&self, time: DateTime<Utc>) {
        self.millis.store(time.timestamp_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, delta: TimeDelta) {
        self.millis.fetch_add(delta.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

/// Round timing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryConfig {
    round_duration: TimeDelta,
    cutoff_offset: TimeDelta,
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            round_duration: TimeDelta::seconds(DEFAULT_ROUND_DURATION.as_secs() as i64),
            cutoff_offset: TimeDelta::seconds(DEFAULT_CUTOFF_OFFSET.as_secs() as i64),
        }
    }
}

impl ExpiryConfig {
    pub fn new(round_duration: Duration, cutoff_offset: Duration) -> Result<Self, TerminalError> {
        let to_delta = |duration: Duration| {
            TimeDelta::from_std(duration).map_err(|e| TerminalError::InvalidArgument(e.to_string()))
        };
        let round_duration = to_delta(round_duration)?;
        let cutoff_offset = to_delta(cutoff_offset)?;

        // Phases compare whole seconds, so a round must last at least one
        if round_duration < TimeDelta::seconds(1) {
            return Err(TerminalError::InvalidArgument(format!(
                "round duration must be at least 1s, got {}ms",
                round_duration.num_milliseconds()
            )));
        }

        if cutoff_offset <= TimeDelta::zero() || cutoff_offset >= round_duration {
            return Err(TerminalError::InvalidArgument(format!(
                "cutoff offset {}s must be within (0, {}s)",
                cutoff_offset.num_seconds(),
                round_duration.num_seconds()
            )));
        }

        Ok(Self {
            round_duration,
            cutoff_offset,
        })
    }

    pub fn round_duration(&self) -> TimeDelta {
        self.round_duration
    }

    pub fn cutoff_offset(&self) -> TimeDelta {
        self.cutoff_offset
    }
}

/// Remaining time split for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Countdown {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Countdown {
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    pub fn from_seconds(total: i64) -> Self {
        let total = total.max(0) as u32;
        Self {
            hours: total / 3_600,
            minutes: total % 3_600 / 60,
            seconds: total % 60,
        }
    }

    pub fn total_seconds(&self) -> i64 {
        self.hours as i64 * 3_600 + self.minutes as i64 * 60 + self.seconds as i64
    }

    pub fn is_zero(&self) -> bool {
        self.total_seconds() == 0
    }
}

impl std::fmt::Display for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// One betting window
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExpiryRound {
    pub cutoff_time: DateTime<Utc>,
    pub settlement_time: DateTime<Utc>,
    pub remaining: Countdown,
    pub order_number: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum RoundPhase {
    /// Before cutoff, entries accepted
    Open,
    /// Between cutoff and settlement, entries rejected
    Locked,
    /// Round complete; only ever observed as an [`ExpiryEvent`]
    Settled,
}

/// Transition crossed by a [`ExpiryTimer::tick`] or [`ExpiryTimer::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum ExpiryEvent {
    Locked { order_number: u64 },
    Settled { order_number: u64 },
    Opened { order_number: u64 },
}

/// Cyclic round countdown gating binary-option entries
pub struct ExpiryTimer {
    config: ExpiryConfig,
    clock: Arc<dyn Clock>,
    round: ExpiryRound,
    phase: RoundPhase,
    now: DateTime<Utc>,
}

impl std::fmt::Debug for ExpiryTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiryTimer")
            .field("config", &self.config)
            .field("round", &self.round)
            .field("phase", &self.phase)
            .field("now", &self.now)
            .finish()
    }
}

impl ExpiryTimer {
    /// Start round 1, settling one full round duration from now.
    pub fn new(config: ExpiryConfig, clock: Arc<dyn Clock>) -> Self {
        let remaining = Countdown::from_seconds(config.round_duration.num_seconds());
        Self::with_remaining(config, clock, remaining)
    }

    /// Start round 1 with an explicit time left before settlement.
    pub fn with_remaining(config: ExpiryConfig, clock: Arc<dyn Clock>, remaining: Countdown) -> Self {
        let now = clock.now();
        let settlement_time = now + TimeDelta::seconds(remaining.total_seconds());
        let mut timer = Self {
            config,
            clock,
            round: ExpiryRound {
                cutoff_time: settlement_time - config.cutoff_offset,
                settlement_time,
                remaining,
                order_number: 1,
            },
            phase: RoundPhase::Open,
            now,
        };
        timer.phase = timer.phase_for(timer.remaining_seconds());
        info!(
            order_number = timer.round.order_number,
            settlement = %timer.round.settlement_time,
            "expiry round started"
        );
        timer
    }

    /// Sample the clock and apply every transition crossed since the last sample.
    pub fn tick(&mut self) -> Vec<ExpiryEvent> {
        let sampled = self.clock.now();
        // Clock corrections never rewind the countdown
        let now = sampled.max(self.now);
        self.update(now)
    }

    /// Apply an explicit elapsed duration instead of sampling the clock.
    pub fn advance(&mut self, elapsed: TimeDelta) -> Vec<ExpiryEvent> {
        let now = self.now + elapsed.max(TimeDelta::zero());
        self.update(now)
    }

    pub fn round(&self) -> &ExpiryRound {
        &self.round
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn remaining(&self) -> Countdown {
        self.round.remaining
    }

    pub fn config(&self) -> &ExpiryConfig {
        &self.config
    }

    pub fn accepts_orders(&self) -> bool {
        self.phase == RoundPhase::Open
    }

    /// Order number of the open round, or [`TerminalError::RoundLocked`].
    pub fn ensure_open(&self) -> Result<u64, TerminalError> {
        if self.accepts_orders() {
            Ok(self.round.order_number)
        } else {
            Err(TerminalError::RoundLocked {
                order_number: self.round.order_number,
            })
        }
    }

    /// Place a binary contract on the open round.
    pub fn open_position(
        &self,
        direction: Direction,
        stake: f64,
        strike_price: f64,
        payout_ratio: f64,
    ) -> Result<BinaryPosition, TerminalError> {
        let order_number = self.ensure_open()?;
        for (field, value) in [
            ("stake", stake),
            ("strike_price", strike_price),
            ("payout_ratio", payout_ratio),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TerminalError::rejected(field, format!("{value} must be positive")));
            }
        }

        Ok(BinaryPosition {
            order_number,
            direction,
            stake,
            strike_price,
            payout_ratio,
        })
    }

    fn update(&mut self, now: DateTime<Utc>) -> Vec<ExpiryEvent> {
        self.now = now;
        let mut events = Vec::new();

        if now >= self.round.settlement_time {
            if self.phase == RoundPhase::Open {
                events.push(ExpiryEvent::Locked {
                    order_number: self.round.order_number,
                });
            }
            events.push(ExpiryEvent::Settled {
                order_number: self.round.order_number,
            });

            // Whole rounds passed while suspended are skipped, not replayed
            let overdue = (now - self.round.settlement_time).num_milliseconds();
            let duration = self.config.round_duration.num_milliseconds();
            let rounds_elapsed = overdue / duration + 1;

            self.round.settlement_time += self.config.round_duration * rounds_elapsed as i32;
            self.round.cutoff_time = self.round.settlement_time - self.config.cutoff_offset;
            self.round.order_number += rounds_elapsed as u64;
            self.phase = RoundPhase::Open;

            info!(
                order_number = self.round.order_number,
                rounds_elapsed,
                "expiry round rolled over"
            );
            events.push(ExpiryEvent::Opened {
                order_number: self.round.order_number,
            });
        }

        let remaining = self.remaining_seconds();
        self.round.remaining = Countdown::from_seconds(remaining);

        let phase = self.phase_for(remaining);
        if phase == RoundPhase::Locked && self.phase == RoundPhase::Open {
            debug!(order_number = self.round.order_number, "expiry round locked");
            events.push(ExpiryEvent::Locked {
                order_number: self.round.order_number,
            });
        }
        self.phase = phase;

        events
    }

    /// Whole seconds left until settlement, rounded up
    fn remaining_seconds(&self) -> i64 {
        let millis = (self.round.settlement_time - self.now).num_milliseconds();
        (millis + 999).div_euclid(1_000).max(0)
    }

    fn phase_for(&self, remaining_seconds: i64) -> RoundPhase {
        if remaining_seconds > self.config.cutoff_offset.num_seconds() {
            RoundPhase::Open
        } else {
            RoundPhase::Locked
        }
    }
}

/// Predicted move of a binary contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

/// Up/down contract placed on one round
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BinaryPosition {
    pub order_number: u64,
    pub direction: Direction,
    pub stake: f64,
    pub strike_price: f64,
    /// Profit per unit staked on a win (0.85 pays 85%)
    pub payout_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settlement {
    pub order_number: u64,
    pub outcome: Outcome,
    pub settlement_price: f64,
    /// Amount returned to the balance
    pub payout: f64,
    pub pnl: f64,
}

impl BinaryPosition {
    pub fn settle(&self, settlement_price: f64) -> Settlement {
        let outcome = match self.direction {
            _ if settlement_price == self.strike_price => Outcome::Draw,
            Direction::Up if settlement_price > self.strike_price => Outcome::Win,
            Direction::Down if settlement_price < self.strike_price => Outcome::Win,
            _ => Outcome::Loss,
        };

        let payout = match outcome {
            Outcome::Win => self.stake * (1.0 + self.payout_ratio),
            Outcome::Draw => self.stake,
            Outcome::Loss => 0.0,
        };

        Settlement {
            order_number: self.order_number,
            outcome,
            settlement_price,
            payout,
            pnl: payout - self.stake,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap()))
    }

    #[test]
    fn test_config_validation() {
        assert!(ExpiryConfig::new(Duration::from_secs(60), Duration::from_secs(30)).is_ok());
        assert!(ExpiryConfig::new(Duration::from_secs(60), Duration::from_secs(60)).is_err());
        assert!(ExpiryConfig::new(Duration::from_secs(60), Duration::ZERO).is_err());
        assert!(matches!(
            ExpiryConfig::new(Duration::from_micros(500), Duration::from_micros(100)),
            Err(TerminalError::InvalidArgument(_))
        ));
        assert!(ExpiryConfig::new(Duration::from_millis(999), Duration::from_millis(500)).is_err());
        assert!(ExpiryConfig::new(Duration::from_secs(2), Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_countdown_display() {
        assert_eq!(Countdown::from_seconds(3_725).to_string(), "01:02:05");
        assert_eq!(Countdown::from_seconds(-4), Countdown::default());
        assert_eq!(Countdown::new(0, 1, 30).total_seconds(), 90);
    }

    #[test]
    fn test_one_decrement_locks_at_cutoff() {
        let mut timer = ExpiryTimer::with_remaining(
            ExpiryConfig::default(),
            clock(),
            Countdown::new(0, 0, 31),
        );
        assert_eq!(timer.phase(), RoundPhase::Open);

        let events = timer.advance(TimeDelta::seconds(1));

        assert_eq!(events, vec![ExpiryEvent::Locked { order_number: 1 }]);
        assert_eq!(timer.phase(), RoundPhase::Locked);
        assert_eq!(timer.remaining(), Countdown::new(0, 0, 30));
        assert!(!timer.accepts_orders());
        assert_eq!(timer.ensure_open(), Err(TerminalError::RoundLocked { order_number: 1 }));
    }

    #[test]
    fn test_settlement_rolls_into_next_round() {
        let mut timer = ExpiryTimer::with_remaining(
            ExpiryConfig::default(),
            clock(),
            Countdown::new(0, 0, 2),
        );
        let settlement = timer.round().settlement_time;

        assert!(timer.advance(TimeDelta::seconds(1)).is_empty());
        let events = timer.advance(TimeDelta::seconds(1));

        assert_eq!(
            events,
            vec![
                ExpiryEvent::Settled { order_number: 1 },
                ExpiryEvent::Opened { order_number: 2 },
            ]
        );
        assert_eq!(timer.phase(), RoundPhase::Open);
        assert_eq!(timer.round().order_number, 2);
        assert_eq!(timer.round().settlement_time, settlement + TimeDelta::seconds(60));
        assert_eq!(timer.round().cutoff_time, settlement + TimeDelta::seconds(30));
        assert_eq!(timer.remaining(), Countdown::new(0, 1, 0));
    }

    #[test]
    fn test_wall_clock_correction_after_suspension() {
        let clock = clock();
        let mut timer = ExpiryTimer::new(ExpiryConfig::default(), clock.clone());

        // Tab backgrounded for 20.5s, a single throttled tick fires afterwards
        clock.advance(TimeDelta::milliseconds(20_500));
        let events = timer.tick();
        assert!(events.is_empty());
        assert_eq!(timer.remaining(), Countdown::new(0, 0, 40));

        // Suspended across two settlements, resuming inside round 3's cutoff window
        clock.advance(TimeDelta::seconds(150));
        let events = timer.tick();
        assert_eq!(
            events,
            vec![
                ExpiryEvent::Locked { order_number: 1 },
                ExpiryEvent::Settled { order_number: 1 },
                ExpiryEvent::Opened { order_number: 3 },
                ExpiryEvent::Locked { order_number: 3 },
            ]
        );
        // 170.5s elapsed of 60s rounds: 9.5s left in round 3, rounded up
        assert_eq!(timer.remaining(), Countdown::new(0, 0, 10));
        assert_eq!(timer.phase(), RoundPhase::Locked);
    }

    #[test]
    fn test_clock_rewind_is_ignored() {
        let clock = clock();
        let mut timer = ExpiryTimer::new(ExpiryConfig::default(), clock.clone());
        clock.advance(TimeDelta::seconds(10));
        timer.tick();

        clock.advance(TimeDelta::seconds(-5));
        timer.tick();
        assert_eq!(timer.remaining(), Countdown::new(0, 0, 50));
    }

    #[test]
    fn test_open_position_rejected_while_locked() {
        let mut timer = ExpiryTimer::new(ExpiryConfig::default(), clock());
        let position = timer.open_position(Direction::Up, 10.0, 100.0, 0.85).unwrap();
        assert_eq!(position.order_number, 1);

        assert!(matches!(
            timer.open_position(Direction::Up, -10.0, 100.0, 0.85),
            Err(TerminalError::ValidationRejected { field: "stake", .. })
        ));

        timer.advance(TimeDelta::seconds(45));
        assert_eq!(
            timer.open_position(Direction::Down, 10.0, 100.0, 0.85),
            Err(TerminalError::RoundLocked { order_number: 1 })
        );
    }

    #[test]
    fn test_binary_settlement() {
        struct TestCase {
            direction: Direction,
            settlement_price: f64,
            expected: Outcome,
            expected_pnl: f64,
        }

        let tests = vec![
            TestCase {
                // TC0: up and the price rose
                direction: Direction::Up,
                settlement_price: 101.0,
                expected: Outcome::Win,
                expected_pnl: 8.5,
            },
            TestCase {
                // TC1: up and the price fell
                direction: Direction::Up,
                settlement_price: 99.0,
                expected: Outcome::Loss,
                expected_pnl: -10.0,
            },
            TestCase {
                // TC2: down and the price fell
                direction: Direction::Down,
                settlement_price: 99.0,
                expected: Outcome::Win,
                expected_pnl: 8.5,
            },
            TestCase {
                // TC3: unchanged price refunds the stake
                direction: Direction::Down,
                settlement_price: 100.0,
                expected: Outcome::Draw,
                expected_pnl: 0.0,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let position = BinaryPosition {
                order_number: 1,
                direction: test.direction,
                stake: 10.0,
                strike_price: 100.0,
                payout_ratio: 0.85,
            };
            let actual = position.settle(test.settlement_price);
            assert_eq!(actual.outcome, test.expected, "TC{} failed", index);
            assert!((actual.pnl - test.expected_pnl).abs() < 1e-9, "TC{} failed", index);
        }
    }
}
