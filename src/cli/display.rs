//! Display utilities for the interval timer CLI.
//!
//! This module provides formatted output for:
//! - Success messages
//! - Error messages
//! - Status display and the live countdown line
//! - Settings and background track lists

use crate::settings::format_time;
use crate::types::{IpcResponse, ResponseData};

/// Shown once when a session completes.
pub const COMPLETION_NOTICE: &str = "Workout Complete!";

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the message of a successful command with the resulting state.
    pub fn show_action(response: &IpcResponse) {
        println!("* {}", response.message);

        if let Some(line) = response.data.as_ref().and_then(Self::render_summary) {
            println!("  {}", line);
        }
    }

    /// Shows the current timer status.
    pub fn show_status(response: &IpcResponse) {
        match &response.data {
            Some(data) => print!("{}", Self::render_status(data)),
            None => println!("The timer is not running"),
        }
    }

    /// Shows the settings with their allowed ranges.
    pub fn show_settings(response: &IpcResponse) {
        if let Some(data) = &response.data {
            print!("{}", Self::render_settings(data));
        }
    }

    /// Shows the background track presets.
    pub fn show_tracks(response: &IpcResponse) {
        if let Some(data) = &response.data {
            print!("{}", Self::render_tracks(data));
        }
    }

    /// Shows the one-time completion notice.
    pub fn show_completion() {
        println!("{}", COMPLETION_NOTICE);
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    /// Human-readable name of a phase.
    fn phase_label(state: &str) -> &str {
        match state {
            "idle" => "Ready",
            "working" => "WORK OUT",
            "resting" => "REST",
            "paused" => "Paused",
            "finished" => "Finished",
            other => other,
        }
    }

    /// `SET: n / N`, or `None` when the data carries no set information.
    fn render_set(data: &ResponseData) -> Option<String> {
        Some(format!("SET: {} / {}", data.current_set?, data.sets?))
    }

    /// One-line summary: phase, set and remaining time.
    pub fn render_summary(data: &ResponseData) -> Option<String> {
        let state = data.state.as_deref()?;
        let mut line = Self::phase_label(state).to_string();
        if let Some(set) = Self::render_set(data) {
            line.push_str(&format!("  {}", set));
        }
        if let Some(remaining) = data.remaining_seconds {
            line.push_str(&format!("  {}", format_time(remaining)));
        }
        Some(line)
    }

    /// Multi-line status block.
    pub fn render_status(data: &ResponseData) -> String {
        let mut out = String::new();
        out.push_str("Bit Timer status\n");
        out.push_str("────────────────\n");

        let state = data.state.as_deref().unwrap_or("unknown");
        out.push_str(&format!("State:     {}\n", Self::phase_label(state)));
        if let Some(set) = Self::render_set(data) {
            out.push_str(&format!("{}\n", set));
        }
        if let Some(remaining) = data.remaining_seconds {
            out.push_str(&format!("Remaining: {}\n", format_time(remaining)));
        }
        if let Some(total) = data.total_seconds {
            out.push_str(&format!("Total:     {}\n", format_time(total)));
        }
        if let Some(track) = &data.track {
            out.push_str(&format!("Music:     {}\n", track.title));
        }
        if data.is_finished == Some(true) {
            out.push_str(&format!("\n{}\n", COMPLETION_NOTICE));
        }
        out
    }

    /// Settings table.
    pub fn render_settings(data: &ResponseData) -> String {
        let mut out = String::new();
        for view in data.settings.iter().flatten() {
            let shown = |value: u32| {
                if view.setting.is_duration() {
                    format_time(value)
                } else {
                    value.to_string()
                }
            };
            out.push_str(&format!(
                "{:<9} {:>6}   (range {} - {}, step {})\n",
                view.label,
                shown(view.value),
                shown(view.min),
                shown(view.max),
                view.step
            ));
        }
        if let Some(total) = data.total_seconds {
            out.push_str(&format!("{:<9} {:>6}\n", "TOTAL", format_time(total)));
        }
        out
    }

    /// Numbered track list with the selection marked.
    pub fn render_tracks(data: &ResponseData) -> String {
        let mut out = String::new();
        for track in data.tracks.iter().flatten() {
            let marker = if track.selected { "*" } else { " " };
            out.push_str(&format!("{} {}. {}\n", marker, track.number, track.name));
        }
        out
    }
}

// ============================================================================
// Tests
// ============================================================================
