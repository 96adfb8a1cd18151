//! Core data types for the interval timer.
//!
//! This module defines the data structures used for:
//! - Session configuration (sets, work and rest durations)
//! - Timer state and the commands that drive it
//! - IPC request/response serialization

use serde::{Deserialize, Serialize};

// ============================================================================
// Setting
// ============================================================================

/// One of the three tunable session quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Setting {
    /// Number of work/rest cycles
    Sets,
    /// Work phase duration in seconds
    #[serde(alias = "workTime", alias = "work_seconds")]
    Work,
    /// Rest phase duration in seconds
    #[serde(alias = "restTime", alias = "rest_seconds")]
    Rest,
}

impl Setting {
    /// All settings, in display order.
    pub const ALL: [Setting; 3] = [Setting::Sets, Setting::Work, Setting::Rest];

    /// Returns the string representation of the setting.
    pub fn as_str(&self) -> &'static str {
        match self {
            Setting::Sets => "sets",
            Setting::Work => "work",
            Setting::Rest => "rest",
        }
    }

    /// Returns the label shown next to the setting value.
    pub fn label(&self) -> &'static str {
        match self {
            Setting::Sets => "SET",
            Setting::Work => "WORK OUT",
            Setting::Rest => "REST",
        }
    }

    /// Returns true if the setting is a duration in seconds.
    pub fn is_duration(&self) -> bool {
        !matches!(self, Setting::Sets)
    }
}

impl std::fmt::Display for Setting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SessionConfig
// ============================================================================

/// Configuration of one interval session.
///
/// Value domains are enforced where values are edited (see
/// [`crate::settings`]), not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Number of sets
    pub sets: u32,
    /// Work phase duration in seconds
    pub work_seconds: u32,
    /// Rest phase duration in seconds
    pub rest_seconds: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sets: 3,
            work_seconds: 25,
            rest_seconds: 10,
        }
    }
}

impl SessionConfig {
    /// Creates a new configuration with the specified set count.
    pub fn with_sets(mut self, sets: u32) -> Self {
        self.sets = sets;
        self
    }

    /// Creates a new configuration with the specified work duration.
    pub fn with_work_seconds(mut self, seconds: u32) -> Self {
        self.work_seconds = seconds;
        self
    }

    /// Creates a new configuration with the specified rest duration.
    pub fn with_rest_seconds(mut self, seconds: u32) -> Self {
        self.rest_seconds = seconds;
        self
    }

    /// Returns the current value of a setting.
    pub fn get(&self, setting: Setting) -> u32 {
        match setting {
            Setting::Sets => self.sets,
            Setting::Work => self.work_seconds,
            Setting::Rest => self.rest_seconds,
        }
    }

    /// Returns a copy of this configuration with one setting replaced.
    pub fn with(self, setting: Setting, value: u32) -> Self {
        match setting {
            Setting::Sets => self.with_sets(value),
            Setting::Work => self.with_work_seconds(value),
            Setting::Rest => self.with_rest_seconds(value),
        }
    }
}

// ============================================================================
// TimerPhase
// ============================================================================

/// Display phase derived from a [`TimerState`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    /// Not counting, nothing in progress
    #[default]
    Idle,
    /// Counting down a work phase
    Working,
    /// Counting down a rest phase
    Resting,
    /// Not counting, session in progress
    Paused,
    /// The last rest phase just completed
    Finished,
}

impl TimerPhase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Working => "working",
            TimerPhase::Resting => "resting",
            TimerPhase::Paused => "paused",
            TimerPhase::Finished => "finished",
        }
    }

    /// Returns true if the timer is actively counting down.
    pub fn is_active(&self) -> bool {
        matches!(self, TimerPhase::Working | TimerPhase::Resting)
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// The complete state of the interval timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    /// Session configuration
    pub config: SessionConfig,
    /// Current set, starting at 1
    pub current_set: u32,
    /// Seconds left in the current phase
    pub remaining_seconds: u32,
    /// True during a work phase, false during a rest phase
    pub is_working: bool,
    /// True while counting down
    pub is_active: bool,
    /// True from the moment the last rest completes until acknowledged
    pub is_finished: bool,
    /// True from the first start until reset or completion
    pub in_session: bool,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl TimerState {
    /// Creates an idle state for the given configuration.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            current_set: 1,
            remaining_seconds: config.work_seconds,
            is_working: true,
            is_active: false,
            is_finished: false,
            in_session: false,
        }
    }

    /// Returns the display phase for this state.
    pub fn phase(&self) -> TimerPhase {
        if self.is_finished {
            TimerPhase::Finished
        } else if self.is_active {
            if self.is_working {
                TimerPhase::Working
            } else {
                TimerPhase::Resting
            }
        } else if !self.in_session {
            TimerPhase::Idle
        } else {
            TimerPhase::Paused
        }
    }
}

// ============================================================================
// TimerCommand
// ============================================================================

/// Inputs accepted by the timer state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    /// One second elapsed
    Tick,
    /// Start, resume or pause
    StartPause,
    /// Move to the next phase
    PhaseAdvance,
    /// Return to the idle shape, keeping the configuration
    Reset,
    /// Clear the one-shot finished flag
    AcknowledgeFinish,
    /// Replace one configuration value
    SetConfig {
        /// Setting to replace
        setting: Setting,
        /// New value
        value: u32,
    },
}

// ============================================================================
// IPC Types
// ============================================================================

/// IPC request from client to daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum IpcRequest {
    /// Start when idle or paused, pause when running
    Toggle,
    /// Start or resume the timer
    Start,
    /// Pause the running timer
    Pause,
    /// Reset the session, keeping the configuration
    Reset,
    /// Skip the rest of the current work phase
    Skip,
    /// Change a setting
    Set {
        /// Setting to change
        setting: Setting,
        /// Proposed value (clamped to the setting's domain)
        value: u32,
    },
    /// Acknowledge a completed session
    Ack,
    /// Query the current status
    Status,
    /// Query setting values and domains
    Settings,
    /// Query the background track presets
    Tracks,
    /// Select a background track
    Select {
        /// Preset number (1-based), track id, or "none"
        track: String,
    },
}

/// A setting value together with its editing domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingView {
    /// Setting identifier
    pub setting: Setting,
    /// Display label
    pub label: String,
    /// Current value
    pub value: u32,
    /// Smallest accepted value
    pub min: u32,
    /// Largest accepted value
    pub max: u32,
    /// Slider step
    pub step: u32,
}

/// A background track preset as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackView {
    /// Preset number (1-based)
    pub number: usize,
    /// Human-readable title
    pub name: String,
    /// Track identifier; `None` is the "no music" sentinel
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
    /// Whether this preset is currently selected
    pub selected: bool,
}

/// The currently selected background track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSelection {
    /// Track identifier; `None` means no music
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
    /// Human-readable title
    pub title: String,
}

/// Response data for IPC responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseData {
    /// Current display phase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Seconds left in the current phase
    #[serde(rename = "remainingSeconds", skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u32>,
    /// Current set
    #[serde(rename = "currentSet", skip_serializing_if = "Option::is_none")]
    pub current_set: Option<u32>,
    /// Configured set count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    /// Configured work duration
    #[serde(rename = "workSeconds", skip_serializing_if = "Option::is_none")]
    pub work_seconds: Option<u32>,
    /// Configured rest duration
    #[serde(rename = "restSeconds", skip_serializing_if = "Option::is_none")]
    pub rest_seconds: Option<u32>,
    /// Whether the timer is counting down
    #[serde(rename = "isActive", skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// Whether a completed session awaits acknowledgement
    #[serde(rename = "isFinished", skip_serializing_if = "Option::is_none")]
    pub is_finished: Option<bool>,
    /// Total session duration in seconds
    #[serde(rename = "totalSeconds", skip_serializing_if = "Option::is_none")]
    pub total_seconds: Option<u32>,
    /// Selected background track
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<TrackSelection>,
    /// Setting values and domains
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Vec<SettingView>>,
    /// Background track presets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracks: Option<Vec<TrackView>>,
}

impl ResponseData {
    /// Creates response data from timer state.
    pub fn from_timer_state(state: &TimerState) -> Self {
        Self {
            state: Some(state.phase().as_str().to_string()),
            remaining_seconds: Some(state.remaining_seconds),
            current_set: Some(state.current_set),
            sets: Some(state.config.sets),
            work_seconds: Some(state.config.work_seconds),
            rest_seconds: Some(state.config.rest_seconds),
            is_active: Some(state.is_active),
            is_finished: Some(state.is_finished),
            total_seconds: Some(crate::settings::total_duration(&state.config)),
            ..Default::default()
        }
    }

    /// Attaches the selected track.
    pub fn with_track(mut self, track: TrackSelection) -> Self {
        self.track = Some(track);
        self
    }
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Returns true if this is an error response.
    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Setting Tests
    // ------------------------------------------------------------------------

    mod setting_tests {
        use super::*;

        #[test]
        fn test_as_str_and_label() {
            assert_eq!(Setting::Sets.as_str(), "sets");
            assert_eq!(Setting::Work.as_str(), "work");
            assert_eq!(Setting::Rest.as_str(), "rest");
            assert_eq!(Setting::Work.label(), "WORK OUT");
        }

        #[test]
        fn test_is_duration() {
            assert!(!Setting::Sets.is_duration());
            assert!(Setting::Work.is_duration());
            assert!(Setting::Rest.is_duration());
        }

        #[test]
        fn test_deserialize_aliases() {
            let setting: Setting = serde_json::from_str("\"workTime\"").unwrap();
            assert_eq!(setting, Setting::Work);
            let setting: Setting = serde_json::from_str("\"rest\"").unwrap();
            assert_eq!(setting, Setting::Rest);
        }
    }

    // ------------------------------------------------------------------------
    // SessionConfig Tests
    // ------------------------------------------------------------------------

    mod session_config_tests {
        use super::*;

        #[test]
        fn test_default_values() {
            let config = SessionConfig::default();
            assert_eq!(config.sets, 3);
            assert_eq!(config.work_seconds, 25);
            assert_eq!(config.rest_seconds, 10);
        }

        #[test]
        fn test_builder_pattern() {
            let config = SessionConfig::default()
                .with_sets(5)
                .with_work_seconds(40)
                .with_rest_seconds(20);

            assert_eq!(config.sets, 5);
            assert_eq!(config.work_seconds, 40);
            assert_eq!(config.rest_seconds, 20);
        }

        #[test]
        fn test_get_and_with() {
            let config = SessionConfig::default().with(Setting::Rest, 0);
            assert_eq!(config.get(Setting::Rest), 0);
            assert_eq!(config.get(Setting::Sets), 3);
            assert_eq!(config.get(Setting::Work), 25);
        }

        #[test]
        fn test_serialize_camel_case() {
            let json = serde_json::to_string(&SessionConfig::default()).unwrap();
            assert!(json.contains("\"workSeconds\":25"));
            assert!(json.contains("\"restSeconds\":10"));
        }
    }

    // ------------------------------------------------------------------------
    // TimerState Tests
    // ------------------------------------------------------------------------

    mod timer_state_tests {
        use super::*;

        #[test]
        fn test_new_state() {
            let state = TimerState::new(SessionConfig::default().with_work_seconds(40));

            assert_eq!(state.current_set, 1);
            assert_eq!(state.remaining_seconds, 40);
            assert!(state.is_working);
            assert!(!state.is_active);
            assert!(!state.is_finished);
        }

        #[test]
        fn test_phase_idle() {
            let state = TimerState::default();
            assert_eq!(state.phase(), TimerPhase::Idle);
            assert!(!state.phase().is_active());
        }

        #[test]
        fn test_phase_working_and_resting() {
            let mut state = TimerState::default();
            state.is_active = true;
            assert_eq!(state.phase(), TimerPhase::Working);

            state.is_working = false;
            assert_eq!(state.phase(), TimerPhase::Resting);
        }

        #[test]
        fn test_phase_paused_mid_session() {
            let mut state = TimerState::default();
            state.in_session = true;
            state.remaining_seconds = 12;
            assert_eq!(state.phase(), TimerPhase::Paused);
        }

        #[test]
        fn test_phase_paused_before_first_tick() {
            let mut state = TimerState::default();
            state.in_session = true;
            assert_eq!(state.remaining_seconds, state.config.work_seconds);
            assert_eq!(state.phase(), TimerPhase::Paused);
        }

        #[test]
        fn test_phase_default_is_idle() {
            assert_eq!(TimerPhase::default(), TimerPhase::Idle);
        }

        #[test]
        fn test_phase_finished_wins() {
            let mut state = TimerState::default();
            state.is_finished = true;
            assert_eq!(state.phase(), TimerPhase::Finished);
        }

        #[test]
        fn test_serialize_deserialize() {
            let mut state = TimerState::default();
            state.current_set = 2;
            state.remaining_seconds = 7;

            let json = serde_json::to_string(&state).unwrap();
            assert!(json.contains("\"currentSet\":2"));

            let deserialized: TimerState = serde_json::from_str(&json).unwrap();
            assert_eq!(deserialized, state);
        }
    }

    // ------------------------------------------------------------------------
    // IPC Types Tests
    // ------------------------------------------------------------------------

    mod ipc_tests {
        use super::*;

        #[test]
        fn test_ipc_request_unit_serialize() {
            let json = serde_json::to_string(&IpcRequest::Toggle).unwrap();
            assert_eq!(json, r#"{"command":"toggle"}"#);

            let json = serde_json::to_string(&IpcRequest::Ack).unwrap();
            assert_eq!(json, r#"{"command":"ack"}"#);
        }

        #[test]
        fn test_ipc_request_set_deserialize() {
            let json = r#"{"command":"set","setting":"work","value":40}"#;
            let request: IpcRequest = serde_json::from_str(json).unwrap();

            match request {
                IpcRequest::Set { setting, value } => {
                    assert_eq!(setting, Setting::Work);
                    assert_eq!(value, 40);
                }
                _ => panic!("Expected Set request"),
            }
        }

        #[test]
        fn test_ipc_request_select_deserialize() {
            let json = r#"{"command":"select","track":"none"}"#;
            let request: IpcRequest = serde_json::from_str(json).unwrap();
            assert!(matches!(request, IpcRequest::Select { track } if track == "none"));
        }

        #[test]
        fn test_ipc_request_unknown_command_rejected() {
            let json = r#"{"command":"explode"}"#;
            assert!(serde_json::from_str::<IpcRequest>(json).is_err());
        }

        #[test]
        fn test_response_data_from_timer_state() {
            let mut state = TimerState::default();
            state.is_active = true;
            state.current_set = 2;
            state.remaining_seconds = 14;

            let data = ResponseData::from_timer_state(&state);

            assert_eq!(data.state, Some("working".to_string()));
            assert_eq!(data.remaining_seconds, Some(14));
            assert_eq!(data.current_set, Some(2));
            assert_eq!(data.sets, Some(3));
            assert_eq!(data.total_seconds, Some(105));
            assert_eq!(data.is_active, Some(true));
            assert!(data.track.is_none());
        }

        #[test]
        fn test_ipc_response_serialize_omits_empty_fields() {
            let response = IpcResponse::success(
                "OK",
                Some(ResponseData {
                    state: Some("idle".to_string()),
                    remaining_seconds: Some(25),
                    ..Default::default()
                }),
            );

            let json = serde_json::to_string(&response).unwrap();
            assert!(json.contains("\"status\":\"success\""));
            assert!(json.contains("\"remainingSeconds\":25"));
            assert!(!json.contains("track"));
            assert!(!json.contains("settings"));
        }

        #[test]
        fn test_ipc_response_error() {
            let response = IpcResponse::error("Timer is not running");

            assert!(response.is_error());
            assert_eq!(response.message, "Timer is not running");
            assert!(response.data.is_none());
        }

        #[test]
        fn test_track_selection_none_serializes_null() {
            let track = TrackSelection {
                video_id: None,
                title: "No music".to_string(),
            };
            let json = serde_json::to_string(&track).unwrap();
            assert_eq!(json, r#"{"videoId":null,"title":"No music"}"#);
        }
    }
}
