//! Clock driver for the interval timer.
//!
//! The driver observes `(is_active, remaining_seconds)` after every state
//! change and keeps exactly one periodic tick emission alive while the timer
//! is counting down. Every change cancels the previous emission and bumps a
//! generation counter, so ticks already queued by a cancelled emission are
//! rejected by [`ClockDriver::accepts`].

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::trace;

use crate::types::TimerState;

/// Period between two ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

// ============================================================================
// ClockTick
// ============================================================================

/// A one-second tick, stamped with the emission that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTick {
    /// Generation of the emission that sent this tick
    pub generation: u64,
}

// ============================================================================
// TickScheduler
// ============================================================================

/// Starts and cancels the periodic tick emission.
///
/// `start` is only called after `cancel`, so implementations never run two
/// emissions at once.
pub trait TickScheduler: Send + Sync {
    /// Starts emitting ticks stamped with `generation` once per period.
    fn start(&mut self, generation: u64);

    /// Cancels the current emission, if any.
    fn cancel(&mut self);
}

/// Tick scheduler backed by a tokio task and `tokio::time::interval`.
pub struct TokioTickScheduler {
    tick_tx: mpsc::UnboundedSender<ClockTick>,
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl TokioTickScheduler {
    /// Creates a scheduler that sends ticks on `tick_tx` every second.
    pub fn new(tick_tx: mpsc::UnboundedSender<ClockTick>) -> Self {
        Self::with_period(tick_tx, TICK_PERIOD)
    }

    /// Creates a scheduler with a custom tick period.
    pub fn with_period(tick_tx: mpsc::UnboundedSender<ClockTick>, period: Duration) -> Self {
        Self {
            tick_tx,
            period,
            handle: None,
        }
    }
}

impl TickScheduler for TokioTickScheduler {
    fn start(&mut self, generation: u64) {
        self.cancel();

        let tick_tx = self.tick_tx.clone();
        let period = self.period;
        self.handle = Some(tokio::spawn(async move {
            // First tick one full period after the state change.
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if tick_tx.send(ClockTick { generation }).is_err() {
                    break;
                }
            }
        }));
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for TokioTickScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A call recorded by [`MockTickScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerCall {
    /// `start(generation)`
    Start(u64),
    /// `cancel()`
    Cancel,
}

/// Mock tick scheduler for testing.
///
/// Clones share the call log, so a test can keep one handle while the
/// driver owns another.
#[derive(Debug, Clone, Default)]
pub struct MockTickScheduler {
    calls: Arc<Mutex<Vec<SchedulerCall>>>,
}

impl MockTickScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<SchedulerCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of emissions started so far.
    #[must_use]
    pub fn start_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| matches!(call, SchedulerCall::Start(_)))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl TickScheduler for MockTickScheduler {
    fn start(&mut self, generation: u64) {
        self.calls
            .lock()
            .unwrap()
            .push(SchedulerCall::Start(generation));
    }

    fn cancel(&mut self) {
        self.calls.lock().unwrap().push(SchedulerCall::Cancel);
    }
}

// ============================================================================
// ClockDriver
// ============================================================================

/// Derives the tick emission from the observed timer state.
pub struct ClockDriver {
    scheduler: Box<dyn TickScheduler>,
    generation: u64,
    running: bool,
    observed: Option<(bool, u32)>,
}

impl ClockDriver {
    /// Creates a driver that has not observed any state yet.
    pub fn new(scheduler: impl TickScheduler + 'static) -> Self {
        Self {
            scheduler: Box::new(scheduler),
            generation: 0,
            running: false,
            observed: None,
        }
    }

    /// Re-evaluates the running condition against a new state.
    ///
    /// Does nothing when neither `is_active` nor `remaining_seconds` changed.
    pub fn observe(&mut self, state: &TimerState) {
        let observation = (state.is_active, state.remaining_seconds);
        if self.observed == Some(observation) {
            return;
        }
        self.observed = Some(observation);

        if self.running {
            self.scheduler.cancel();
            self.running = false;
        }
        self.generation += 1;

        if state.is_active && state.remaining_seconds > 0 {
            trace!(generation = self.generation, "starting tick emission");
            self.scheduler.start(self.generation);
            self.running = true;
        }
    }

    /// Returns true if the tick comes from the current emission.
    pub fn accepts(&self, tick: ClockTick) -> bool {
        self.running && tick.generation == self.generation
    }

    /// Returns true while a tick emission is scheduled.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns the generation of the latest observation.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl std::fmt::Debug for ClockDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClockDriver")
            .field("generation", &self.generation)
            .field("running", &self.running)
            .field("observed", &self.observed)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
