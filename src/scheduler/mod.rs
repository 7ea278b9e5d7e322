//! Poll scheduler - drives rounds on a fast trigger.
//!
//! A ticker fires every `tick` (animation-frame-like, 16 ms by default).
//! Each firing passes through two gates before a round is issued:
//! - [`Throttle`]: less than one rate interval since the last round is skipped
//! - [`SingleFlight`]: a round still awaiting its response is never overlapped
//!
//! # States
//!
//! ```text
//!            start(): immediate round, arm ticker
//!   PAUSED ---------------------------------------> RUNNING
//!          <---------------------------------------
//!            stop(): disarm ticker (in-flight round completes)
//! ```

mod flight;
mod rate;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::client::{LinkClient, RoundOutcome};
use crate::transport::Transport;

pub use flight::{FlightGuard, SingleFlight};
pub use rate::{PollRate, Throttle, DEFAULT_RATE_HZ, MAX_RATE_HZ, MIN_RATE_HZ};

/// Default trigger period.
pub const DEFAULT_TICK: Duration = Duration::from_millis(16);

/// Scheduler configuration.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Maximum round rate.
    pub rate: PollRate,
    /// Trigger period.
    pub tick: Duration,
}

impl SchedulerConfig {
    /// Set the round rate.
    pub fn with_rate(mut self, rate: PollRate) -> Self {
        self.rate = rate;
        self
    }

    /// Set the trigger period. A zero period falls back to the default.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = if tick.is_zero() { DEFAULT_TICK } else { tick };
        self
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            rate: PollRate::default(),
            tick: DEFAULT_TICK,
        }
    }
}

/// What a trigger did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A round was issued.
    Started,
    /// Too soon after the previous round.
    Throttled,
    /// A round is still awaiting its response.
    InFlight,
}

/// Scheduler counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub rounds_started: u64,
    pub rounds_completed: u64,
    pub transport_failures: u64,
    pub triggers_throttled: u64,
    pub skipped_in_flight: u64,
}

#[derive(Debug, Default)]
struct Counters {
    rounds_started: AtomicU64,
    rounds_completed: AtomicU64,
    transport_failures: AtomicU64,
    triggers_throttled: AtomicU64,
    skipped_in_flight: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> SchedulerStats {
        SchedulerStats {
            rounds_started: self.rounds_started.load(Ordering::Relaxed),
            rounds_completed: self.rounds_completed.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
            triggers_throttled: self.triggers_throttled.load(Ordering::Relaxed),
            skipped_in_flight: self.skipped_in_flight.load(Ordering::Relaxed),
        }
    }
}

struct Shared<T> {
    client: LinkClient<T>,
    flight: SingleFlight,
    throttle: Mutex<Throttle>,
    counters: Counters,
}

impl<T: Transport> Shared<T> {
    fn trigger(self: &Arc<Self>, now: Instant) -> Trigger {
        if self.flight.is_busy() {
            self.counters.skipped_in_flight.fetch_add(1, Ordering::Relaxed);
            return Trigger::InFlight;
        }
        if !self.throttle.lock().ready(now) {
            self.counters.triggers_throttled.fetch_add(1, Ordering::Relaxed);
            return Trigger::Throttled;
        }
        self.launch()
    }

    fn poll_now(self: &Arc<Self>, now: Instant) -> Trigger {
        let outcome = self.launch();
        if outcome == Trigger::Started {
            self.throttle.lock().mark(now);
        }
        outcome
    }

    fn launch(self: &Arc<Self>) -> Trigger {
        let Some(guard) = self.flight.try_begin() else {
            self.counters.skipped_in_flight.fetch_add(1, Ordering::Relaxed);
            tracing::trace!("Round in flight, trigger skipped");
            return Trigger::InFlight;
        };

        self.counters.rounds_started.fetch_add(1, Ordering::Relaxed);
        let shared = self.clone();
        tokio::spawn(async move {
            let report = shared.client.round().await;
            if report.outcome == RoundOutcome::TransportFailed {
                shared
                    .counters
                    .transport_failures
                    .fetch_add(1, Ordering::Relaxed);
            }
            shared
                .counters
                .rounds_completed
                .fetch_add(1, Ordering::Relaxed);
            drop(guard);
        });
        Trigger::Started
    }
}

/// Issues poll rounds for a [`LinkClient`] at a bounded rate.
///
/// Must be started from within a tokio runtime.
///
/// # Example
///
/// ```ignore
/// let mut scheduler = PollScheduler::new(client.clone(), SchedulerConfig::default());
/// scheduler.start();
/// // ... enqueue / drain through `client` ...
/// scheduler.stop();
/// ```
pub struct PollScheduler<T: Transport> {
    shared: Arc<Shared<T>>,
    tick: Duration,
    ticker: Option<JoinHandle<()>>,
}

impl<T: Transport> PollScheduler<T> {
    /// Create a paused scheduler.
    pub fn new(client: LinkClient<T>, config: SchedulerConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                client,
                flight: SingleFlight::new(),
                throttle: Mutex::new(Throttle::new(config.rate.interval())),
                counters: Counters::default(),
            }),
            tick: config.tick,
            ticker: None,
        }
    }

    /// PAUSED -> RUNNING: issue a round immediately, then arm the ticker.
    /// No-op if already running.
    pub fn start(&mut self) {
        if self.ticker.is_some() {
            return;
        }
        tracing::info!(
            interval = ?self.shared.throttle.lock().interval(),
            tick = ?self.tick,
            "Poll scheduler started"
        );

        self.shared.poll_now(Instant::now());

        let shared = self.shared.clone();
        let tick = self.tick;
        self.ticker = Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + tick, tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                shared.trigger(Instant::now());
            }
        }));
    }

    /// RUNNING -> PAUSED: disarm the ticker. A round already in flight
    /// still completes and is applied.
    pub fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
            tracing::info!("Poll scheduler stopped");
        }
    }

    /// Check if the ticker is armed.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Fire the trigger once, subject to both gates.
    pub fn trigger(&self) -> Trigger {
        self.shared.trigger(Instant::now())
    }

    /// Issue a round now, bypassing the throttle but not the single-flight
    /// gate.
    pub fn poll_now(&self) -> Trigger {
        self.shared.poll_now(Instant::now())
    }

    /// Check if a round is awaiting its response.
    #[inline]
    pub fn is_round_in_flight(&self) -> bool {
        self.shared.flight.is_busy()
    }

    /// Change the round rate; takes effect on the next trigger.
    pub fn set_rate(&self, rate: PollRate) {
        self.shared.throttle.lock().set_interval(rate.interval());
        tracing::debug!(rate = %rate, "Poll rate changed");
    }

    /// Counter snapshot.
    pub fn stats(&self) -> SchedulerStats {
        self.shared.counters.snapshot()
    }

    /// The driven client.
    pub fn client(&self) -> &LinkClient<T> {
        &self.shared.client
    }
}

impl<T: Transport> Drop for PollScheduler<T> {
    fn drop(&mut self) {
        self.stop();
    }
}
