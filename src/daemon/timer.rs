//! Timer engine for the interval timer.
//!
//! This module provides the core timer functionality:
//! - The pure transition function over [`TimerCommand`]
//! - Phase progression (Working → Resting → next set → … → Finished)
//! - Immediate cascading through zero-length phases
//! - Tick handling driven by the [`ClockDriver`]
//! - Event firing for logging and external integrations

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

use super::clock::{ClockDriver, ClockTick};
use crate::types::{SessionConfig, Setting, TimerCommand, TimerPhase, TimerState};

// ============================================================================
// Transition function
// ============================================================================

/// Applies one command to a state and returns the next state.
///
/// Total over its input: commands whose precondition does not hold return
/// the state unchanged.
pub fn transition(state: TimerState, command: TimerCommand) -> TimerState {
    match command {
        // The clock stops at zero, so this never needs to go below it.
        TimerCommand::Tick => TimerState {
            remaining_seconds: state.remaining_seconds.saturating_sub(1),
            ..state
        },
        TimerCommand::StartPause if !state.is_active => TimerState {
            is_active: true,
            is_finished: false,
            in_session: true,
            ..state
        },
        TimerCommand::StartPause => TimerState {
            is_active: false,
            ..state
        },
        TimerCommand::PhaseAdvance => advance_phase(state),
        TimerCommand::Reset => TimerState::new(state.config),
        TimerCommand::AcknowledgeFinish if state.is_finished => TimerState {
            is_finished: false,
            ..state
        },
        TimerCommand::AcknowledgeFinish => state,
        TimerCommand::SetConfig { setting, value } => {
            let remaining_seconds = if setting == Setting::Work && !state.is_active {
                value
            } else {
                state.remaining_seconds
            };
            TimerState {
                config: state.config.with(setting, value),
                remaining_seconds,
                ..state
            }
        }
    }
}

fn advance_phase(state: TimerState) -> TimerState {
    if state.is_working {
        TimerState {
            is_working: false,
            remaining_seconds: state.config.rest_seconds,
            ..state
        }
    } else if state.current_set < state.config.sets {
        TimerState {
            is_working: true,
            current_set: state.current_set + 1,
            remaining_seconds: state.config.work_seconds,
            ..state
        }
    } else {
        TimerState {
            is_finished: true,
            ..TimerState::new(state.config)
        }
    }
}

// ============================================================================
// TimerEvent
// ============================================================================

/// Timer events for logging and external integrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// A session started from the idle shape
    Started,
    /// A paused session resumed
    Resumed,
    /// The timer paused
    Paused,
    /// One second elapsed
    Tick {
        /// Remaining seconds after the tick
        remaining_seconds: u32,
    },
    /// A rest phase began
    RestStarted {
        /// Set the rest belongs to
        set: u32,
    },
    /// A work phase began
    WorkStarted {
        /// Set the work phase belongs to
        set: u32,
    },
    /// The last rest phase completed
    SessionCompleted {
        /// Number of sets completed
        sets: u32,
    },
    /// The completion notice was acknowledged
    FinishAcknowledged,
    /// The session was reset
    Reset,
    /// A setting changed
    ConfigChanged {
        /// Setting that changed
        setting: Setting,
        /// New value
        value: u32,
    },
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Timer engine that owns the timer state and the clock driver.
pub struct TimerEngine {
    /// Current timer state
    state: TimerState,
    /// Tick emission derived from the state
    clock: ClockDriver,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerEngine {
    /// Creates a new TimerEngine in the idle shape.
    pub fn new(
        config: SessionConfig,
        mut clock: ClockDriver,
        event_tx: mpsc::UnboundedSender<TimerEvent>,
    ) -> Self {
        let state = TimerState::new(config);
        clock.observe(&state);
        Self {
            state,
            clock,
            event_tx,
        }
    }

    /// Applies a command, cascades through zero-length phases and re-syncs
    /// the clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the event channel is closed.
    pub fn dispatch(&mut self, command: TimerCommand) -> Result<()> {
        let previous = self.state;
        let mut events = Vec::new();

        let mut next = transition(previous, command);
        Self::command_events(command, &previous, &next, &mut events);

        while next.is_active && next.remaining_seconds == 0 {
            let advanced = transition(next, TimerCommand::PhaseAdvance);
            Self::phase_event(&advanced, &mut events);
            next = advanced;
        }

        if next != previous {
            debug!(
                ?command,
                phase = next.phase().as_str(),
                set = next.current_set,
                remaining = next.remaining_seconds,
                "timer state changed"
            );
        }

        self.state = next;
        self.clock.observe(&self.state);

        for event in events {
            self.event_tx
                .send(event)
                .context("Failed to send timer event")?;
        }

        Ok(())
    }

    /// Applies a tick if it belongs to the current clock emission.
    ///
    /// Returns false for stale ticks, which are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the event channel is closed.
    pub fn handle_tick(&mut self, tick: ClockTick) -> Result<bool> {
        if !self.clock.accepts(tick) {
            debug!(generation = tick.generation, "dropping stale tick");
            return Ok(false);
        }
        self.dispatch(TimerCommand::Tick)?;
        Ok(true)
    }

    /// Skips the rest of the current work phase.
    ///
    /// Returns false without touching the state unless the timer is
    /// actively working.
    ///
    /// # Errors
    ///
    /// Returns an error if the event channel is closed.
    pub fn skip_to_rest(&mut self) -> Result<bool> {
        if !(self.state.is_working && self.state.is_active) {
            debug!(phase = self.phase().as_str(), "skip to rest rejected");
            return Ok(false);
        }
        self.dispatch(TimerCommand::PhaseAdvance)?;
        Ok(true)
    }

    /// Returns a reference to the current timer state.
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Returns the current display phase.
    pub fn phase(&self) -> TimerPhase {
        self.state.phase()
    }

    /// Returns the clock driver.
    pub fn clock(&self) -> &ClockDriver {
        &self.clock
    }

    /// Feeds ticks from `tick_rx` into a shared engine until the channel
    /// closes.
    ///
    /// # Errors
    ///
    /// Returns an error if the event channel is closed.
    pub async fn run(
        engine: Arc<Mutex<TimerEngine>>,
        mut tick_rx: mpsc::UnboundedReceiver<ClockTick>,
    ) -> Result<()> {
        while let Some(tick) = tick_rx.recv().await {
            engine.lock().await.handle_tick(tick)?;
        }
        Ok(())
    }

    fn command_events(
        command: TimerCommand,
        previous: &TimerState,
        next: &TimerState,
        events: &mut Vec<TimerEvent>,
    ) {
        match command {
            TimerCommand::Tick => events.push(TimerEvent::Tick {
                remaining_seconds: next.remaining_seconds,
            }),
            TimerCommand::StartPause if next.is_active => {
                if !previous.in_session {
                    events.push(TimerEvent::Started);
                } else {
                    events.push(TimerEvent::Resumed);
                }
            }
            TimerCommand::StartPause => events.push(TimerEvent::Paused),
            TimerCommand::PhaseAdvance => Self::phase_event(next, events),
            TimerCommand::Reset => events.push(TimerEvent::Reset),
            TimerCommand::AcknowledgeFinish if previous.is_finished => {
                events.push(TimerEvent::FinishAcknowledged)
            }
            TimerCommand::AcknowledgeFinish => {}
            TimerCommand::SetConfig { setting, value } => {
                events.push(TimerEvent::ConfigChanged { setting, value })
            }
        }
    }

    fn phase_event(advanced: &TimerState, events: &mut Vec<TimerEvent>) {
        let event = if advanced.is_finished {
            info!(sets = advanced.config.sets, "session completed");
            TimerEvent::SessionCompleted {
                sets: advanced.config.sets,
            }
        } else if advanced.is_working {
            TimerEvent::WorkStarted {
                set: advanced.current_set,
            }
        } else {
            TimerEvent::RestStarted {
                set: advanced.current_set,
            }
        };
        events.push(event);
    }
}

// ============================================================================
// Tests
// ============================================================================
