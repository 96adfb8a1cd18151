//! Bit Timer Library
//!
//! This library provides the core functionality for the interval timer CLI.
//! It includes:
//! - The timer state machine and the clock that drives it
//! - Session configuration editing (domains, clamping, formatting)
//! - IPC server/client for daemon-CLI communication
//! - Background track presets
//! - CLI command parsing and display utilities

pub mod cli;
pub mod daemon;
pub mod media;
pub mod settings;
pub mod types;

// Re-export commonly used types for convenience
pub use daemon::timer::transition;
pub use types::{
    IpcRequest, IpcResponse, ResponseData, SessionConfig, Setting, TimerCommand, TimerPhase,
    TimerState,
};
