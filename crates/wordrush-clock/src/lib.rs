//! Timers for Wordrush room actors.
//!
//! Two primitives, both owned by a single room actor and polled from its
//! `tokio::select!` loop:
//!
//! - [`Ticker`]: the game clock. Fires at a fixed interval for as long as
//!   a game runs, so the room can broadcast the remaining time and notice
//!   when it hits zero. While stopped it pends forever.
//! - [`Deadline`]: a one-shot timer for the current round. Arming it again
//!   replaces the previous instant, disarming it cancels it; either way a
//!   stale deadline can never fire.
//!
//! Because both live inside the actor that owns the room state, cancelling
//! is a plain synchronous field update; no timer task can race the actor.
//!
//! ```ignore
//! loop {
//!     let wake = tokio::select! {
//!         biased;
//!         _ = ticker.wait_for_tick() => Wake::Tick,
//!         _ = round_deadline.wait() => Wake::RoundDeadline,
//!         cmd = commands.recv() => Wake::Command(cmd),
//!     };
//!     // handle `wake` with full access to the room state
//! }
//! ```
//!
//! Everything uses `tokio::time::Instant`, so tests can run on paused time.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What the ticker does after waking up late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickPolicy {
    /// Keep the cadence anchored to the start instant: tick `n` is due at
    /// `start + n × interval` no matter how late earlier ticks were. Late
    /// ticks fire back to back until the schedule catches up.
    #[default]
    Anchored,
    /// Skip the missed ticks and schedule the next one a full interval
    /// from now.
    Skip,
}

/// Configuration for a [`Ticker`].
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Time between ticks. Default: one second.
    pub interval: Duration,
    /// Overrun handling.
    pub policy: TickPolicy,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            policy: TickPolicy::default(),
        }
    }
}

impl TickConfig {
    /// Shortest interval accepted. Anything smaller is clamped.
    pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

    /// A config with the given interval and the default policy.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values. Called by [`Ticker::new`].
    pub fn validated(mut self) -> Self {
        if self.interval < Self::MIN_INTERVAL {
            warn!(
                interval_us = self.interval.as_micros() as u64,
                "tick interval below minimum, clamping"
            );
            self.interval = Self::MIN_INTERVAL;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Ticker
// ---------------------------------------------------------------------------

/// Information about one tick, returned by [`Ticker::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Tick number since the last [`Ticker::start`], starting at 1.
    pub tick: u64,
    /// When this tick was due. Use this, not `Instant::now()`, to compute
    /// anything that must line up with the schedule.
    pub due: Instant,
    /// `true` if the tick woke up more than 10% of an interval late.
    pub overrun: bool,
    /// Ticks dropped by [`TickPolicy::Skip`] to catch up (0 normally).
    pub ticks_skipped: u64,
}

/// A fixed-interval ticker that can be started and stopped.
///
/// One per room actor. Created stopped; [`start`](Self::start) it when a
/// game begins and [`stop`](Self::stop) it when the game ends.
#[derive(Debug)]
pub struct Ticker {
    config: TickConfig,
    tick_count: u64,
    /// When the next tick is due, or `None` while stopped.
    next_tick: Option<Instant>,
}

impl Ticker {
    /// Creates a stopped ticker.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        debug!(
            interval_ms = config.interval.as_secs_f64() * 1000.0,
            policy = ?config.policy,
            "ticker created"
        );
        Self {
            config,
            tick_count: 0,
            next_tick: None,
        }
    }

    /// Creates a stopped ticker with the given interval.
    pub fn every(interval: Duration) -> Self {
        Self::new(TickConfig::with_interval(interval))
    }

    /// Starts (or restarts) the ticker. The first tick is due one interval
    /// after `from`, and the tick counter resets to zero.
    pub fn start(&mut self, from: Instant) {
        self.tick_count = 0;
        self.next_tick = Some(from + self.config.interval);
        debug!("ticker started");
    }

    /// Stops the ticker. A pending [`wait_for_tick`](Self::wait_for_tick)
    /// that is polled again will pend forever. Idempotent.
    pub fn stop(&mut self) {
        if self.next_tick.take().is_some() {
            debug!(ticks = self.tick_count, "ticker stopped");
        }
    }

    /// Whether the ticker is running.
    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Waits for the next tick.
    ///
    /// While stopped, this future never resolves, which lets it sit in a
    /// `select!` next to other branches. It is cancel-safe: the schedule
    /// only advances once the sleep has completed.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let Some(due) = self.next_tick else {
            std::future::pending::<()>().await;
            unreachable!()
        };

        time::sleep_until(due).await;

        let now = Instant::now();
        let interval = self.config.interval;
        self.tick_count += 1;

        let late_by = now.saturating_duration_since(due);
        let overrun = late_by > interval / 10;
        let mut ticks_skipped = 0u64;

        self.next_tick = Some(match self.config.policy {
            TickPolicy::Anchored => due + interval,
            TickPolicy::Skip => {
                if overrun {
                    ticks_skipped = (late_by.as_nanos() / interval.as_nanos()) as u64;
                    if ticks_skipped > 0 {
                        warn!(
                            tick = self.tick_count,
                            skipped = ticks_skipped,
                            late_ms = late_by.as_secs_f64() * 1000.0,
                            "tick overrun, skipping ahead"
                        );
                    }
                }
                now + interval
            }
        });

        if overrun && self.config.policy == TickPolicy::Anchored {
            warn!(
                tick = self.tick_count,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "tick overrun"
            );
        }

        trace!(tick = self.tick_count, overrun, "tick fired");

        TickInfo {
            tick: self.tick_count,
            due,
            overrun,
            ticks_skipped,
        }
    }

    /// Ticks fired since the last start.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The configured interval.
    pub fn interval(&self) -> Duration {
        self.config.interval
    }
}

// ---------------------------------------------------------------------------
// Deadline
// ---------------------------------------------------------------------------

/// A cancellable one-shot timer.
///
/// [`wait`](Self::wait) resolves once at the armed instant and disarms
/// itself, so a deadline fires at most once per arming.
#[derive(Debug, Default)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// Creates a disarmed deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the deadline for `at`, replacing any earlier instant.
    pub fn arm(&mut self, at: Instant) {
        self.at = Some(at);
    }

    /// Cancels the deadline. Returns `true` if it was armed.
    pub fn disarm(&mut self) -> bool {
        self.at.take().is_some()
    }

    /// Arms for `Some(at)`, disarms for `None`.
    pub fn set(&mut self, at: Option<Instant>) {
        self.at = at;
    }

    /// The instant the deadline is armed for.
    pub fn at(&self) -> Option<Instant> {
        self.at
    }

    pub fn is_armed(&self) -> bool {
        self.at.is_some()
    }

    /// Waits until the armed instant, then disarms and returns it.
    ///
    /// Pends forever while disarmed. Cancel-safe.
    pub async fn wait(&mut self) -> Instant {
        let Some(at) = self.at else {
            std::future::pending::<()>().await;
            unreachable!()
        };
        time::sleep_until(at).await;
        self.at = None;
        at
    }
}
