//! Command definitions for the interval timer CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::settings::{self, SettingsError};
use crate::types::{SessionConfig, Setting};

// ============================================================================
// CLI Structure
// ============================================================================

/// Bit Timer CLI - an interval training timer
#[derive(Parser, Debug)]
#[command(
    name = "bit-timer",
    version,
    about = "Interval training (HIIT) timer",
    long_about = "A work/rest interval timer for high-intensity interval training.\n\
                  Run `bit-timer daemon` once, then drive it from any terminal.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Daemon socket path (defaults to ~/.bit-timer/bit-timer.sock)
    #[arg(long, global = true, env = "BIT_TIMER_SOCKET")]
    pub socket: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the timer daemon in the foreground
    Daemon(DaemonArgs),

    /// Start or resume the timer
    Start,

    /// Pause the running timer
    Pause,

    /// Start when stopped, pause when running
    Toggle,

    /// Reset to set 1, keeping the settings
    Reset,

    /// Skip the rest of the current work phase
    Skip,

    /// Dismiss the completion notice
    Ack,

    /// Change a setting (values outside the allowed range are clamped)
    Set(SetArgs),

    /// Show current timer status
    Status,

    /// Show a live countdown until interrupted
    Watch,

    /// Show the settings and their allowed ranges
    Settings,

    /// Background music presets
    #[command(subcommand)]
    Music(MusicCommand),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Background music subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum MusicCommand {
    /// List the presets
    List,

    /// Select a preset by number, track id, or "none"
    Select {
        /// Preset number (1-5), track id, or "none"
        track: String,
    },

    /// Open the selected track in the browser
    Open,
}

// ============================================================================
// Daemon Command Arguments
// ============================================================================

/// Arguments for the daemon command
#[derive(Args, Debug, Clone)]
pub struct DaemonArgs {
    /// Number of sets
    #[arg(long, default_value = "3")]
    pub sets: u32,

    /// Work duration, as seconds or MM:SS
    #[arg(long, default_value = "25", value_parser = parse_duration_arg)]
    pub work: u32,

    /// Rest duration, as seconds or MM:SS
    #[arg(long, default_value = "10", value_parser = parse_duration_arg)]
    pub rest: u32,
}

impl Default for DaemonArgs {
    fn default() -> Self {
        let config = SessionConfig::default();
        Self {
            sets: config.sets,
            work: config.work_seconds,
            rest: config.rest_seconds,
        }
    }
}

impl DaemonArgs {
    /// Returns the session configuration requested on the command line.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            sets: self.sets,
            work_seconds: self.work,
            rest_seconds: self.rest,
        }
    }
}

// ============================================================================
// Set Command Arguments
// ============================================================================

/// Arguments for the set command
#[derive(Args, Debug, Clone)]
pub struct SetArgs {
    /// Setting to change: sets, work or rest
    #[arg(value_parser = parse_setting_arg)]
    pub setting: Setting,

    /// New value: a count for sets, seconds or MM:SS for work and rest
    pub value: String,
}

impl SetArgs {
    /// Parses the value in the form the setting takes.
    pub fn parsed_value(&self) -> Result<u32, SettingsError> {
        settings::parse_value(self.setting, &self.value)
    }
}

// ============================================================================
// Validation Functions
// ============================================================================

fn parse_setting_arg(s: &str) -> Result<Setting, String> {
    settings::parse_setting(s).map_err(|e| e.to_string())
}

fn parse_duration_arg(s: &str) -> Result<u32, String> {
    settings::parse_duration(s).map_err(|e| e.to_string())
}

// ============================================================================
// Tests
// ============================================================================
