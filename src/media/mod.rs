//! Background track presets and selection.
//!
//! The daemon only tracks *which* preset is selected and hands the
//! selection to a [`MediaSink`]. Playback itself belongs to whatever sits
//! behind the sink; the timer never starts, stops or queries it.

use std::sync::Mutex;

use thiserror::Error;
use tracing::info;

use crate::types::{TrackSelection, TrackView};

/// Base URL for opening a track in the browser.
const WATCH_URL_BASE: &str = "https://www.youtube.com/watch?v=";

// ============================================================================
// Presets
// ============================================================================

/// A curated background track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackPreset {
    /// Human-readable title
    pub name: &'static str,
    /// Track identifier; `None` means no music
    pub video_id: Option<&'static str>,
}

impl TrackPreset {
    /// Converts the preset into a selection.
    pub fn selection(&self) -> TrackSelection {
        TrackSelection {
            video_id: self.video_id.map(str::to_string),
            title: self.name.to_string(),
        }
    }
}

/// The fixed preset list. The last entry is the "no music" sentinel.
pub const PRESETS: [TrackPreset; 5] = [
    TrackPreset {
        name: "lofi hip hop radio 📚",
        video_id: Some("jfKfPfyJRdk"),
    },
    TrackPreset {
        name: "jazz lofi radio 🎷",
        video_id: Some("HuFYqnbVbzY"),
    },
    TrackPreset {
        name: "Calm Meditation Music 🙏",
        video_id: Some("inpok4MKVLM"),
    },
    TrackPreset {
        name: "Classic Music 🎹",
        video_id: Some("bwZUs26HZI8"),
    },
    TrackPreset {
        name: "No music",
        video_id: None,
    },
];

/// Returns the watch URL for a track identifier.
pub fn watch_url(video_id: &str) -> String {
    format!("{WATCH_URL_BASE}{video_id}")
}

// ============================================================================
// MediaError
// ============================================================================

/// Errors raised by track selection and media sinks.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The query matched no preset
    #[error("unknown track '{0}': use a preset number, a track id, or 'none'")]
    UnknownTrack(String),

    /// The selection has no track to open
    #[error("no background track is selected")]
    NoTrack,

    /// The sink could not take the selection
    #[error("media sink failed: {0}")]
    SinkFailed(String),
}

// ============================================================================
// TrackSelector
// ============================================================================

/// Holds the currently selected preset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackSelector {
    selected: usize,
}

impl TrackSelector {
    /// Creates a selector with the first preset selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a query to a preset index.
    ///
    /// Accepts a 1-based preset number, a track id, or `none`/`null` for
    /// the no-music sentinel.
    pub fn resolve(query: &str) -> Result<usize, MediaError> {
        let query = query.trim();

        if let Ok(number) = query.parse::<usize>() {
            return match number {
                n if (1..=PRESETS.len()).contains(&n) => Ok(n - 1),
                _ => Err(MediaError::UnknownTrack(query.to_string())),
            };
        }

        if query.eq_ignore_ascii_case("none") || query.eq_ignore_ascii_case("null") {
            return PRESETS
                .iter()
                .position(|preset| preset.video_id.is_none())
                .ok_or_else(|| MediaError::UnknownTrack(query.to_string()));
        }

        PRESETS
            .iter()
            .position(|preset| preset.video_id == Some(query))
            .ok_or_else(|| MediaError::UnknownTrack(query.to_string()))
    }

    /// Selects the preset matching `query` and returns the new selection.
    pub fn select(&mut self, query: &str) -> Result<TrackSelection, MediaError> {
        self.selected = Self::resolve(query)?;
        Ok(self.selection())
    }

    /// Returns the current selection.
    pub fn selection(&self) -> TrackSelection {
        PRESETS[self.selected].selection()
    }

    /// Returns the preset list with the current selection flagged.
    pub fn views(&self) -> Vec<TrackView> {
        PRESETS
            .iter()
            .enumerate()
            .map(|(index, preset)| TrackView {
                number: index + 1,
                name: preset.name.to_string(),
                video_id: preset.video_id.map(str::to_string),
                selected: index == self.selected,
            })
            .collect()
    }
}

// ============================================================================
// MediaSink
// ============================================================================

/// Receives the selected track whenever it changes.
pub trait MediaSink: Send + Sync {
    /// Loads the selection into the playback collaborator.
    ///
    /// # Errors
    ///
    /// Returns an error if the collaborator rejects the selection.
    fn load(&self, selection: &TrackSelection) -> Result<(), MediaError>;
}

/// Media sink that only logs the selection.
#[derive(Debug, Default)]
pub struct LoggingMediaSink;

impl MediaSink for LoggingMediaSink {
    fn load(&self, selection: &TrackSelection) -> Result<(), MediaError> {
        match &selection.video_id {
            Some(video_id) => info!(
                title = %selection.title,
                url = %watch_url(video_id),
                "background track selected"
            ),
            None => info!("background music disabled"),
        }
        Ok(())
    }
}

/// Mock media sink for testing.
#[derive(Debug, Default)]
pub struct MockMediaSink {
    loads: Mutex<Vec<TrackSelection>>,
}

impl MockMediaSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn loads(&self) -> Vec<TrackSelection> {
        self.loads.lock().unwrap().clone()
    }
}

impl MediaSink for MockMediaSink {
    fn load(&self, selection: &TrackSelection) -> Result<(), MediaError> {
        self.loads.lock().unwrap().push(selection.clone());
        Ok(())
    }
}

/// Opens the selected track in the default browser.
///
/// # Errors
///
/// Returns [`MediaError::NoTrack`] for the no-music sentinel, or
/// [`MediaError::SinkFailed`] if the browser cannot be launched.
pub fn open_in_browser(selection: &TrackSelection) -> Result<(), MediaError> {
    let video_id = selection.video_id.as_deref().ok_or(MediaError::NoTrack)?;
    webbrowser::open(&watch_url(video_id)).map_err(|e| MediaError::SinkFailed(e.to_string()))
}

// ============================================================================
// Tests
// ============================================================================
