//! Session configuration editing.
//!
//! This module is the edit boundary for [`SessionConfig`]:
//! - Value domains (`min`, `max`, `step`) for each setting
//! - Clamping of proposed values before they reach the timer
//! - The derived total session duration
//! - `MM:SS` formatting and parsing for durations

use thiserror::Error;

use crate::types::{SessionConfig, Setting, SettingView, TimerState};

// ============================================================================
// SettingsError
// ============================================================================

/// Errors raised while parsing user-supplied setting values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// The value is not a number or `MM:SS` duration
    #[error("invalid value '{0}': expected seconds or MM:SS")]
    InvalidValue(String),

    /// The seconds part of `MM:SS` is 60 or more
    #[error("invalid value '{0}': seconds must be below 60")]
    SecondsOutOfRange(String),

    /// A duration was given where a plain count is expected
    #[error("invalid value '{0}': sets takes a plain count")]
    CountExpected(String),

    /// Setting name not recognized
    #[error("unknown setting '{0}': expected sets, work or rest")]
    UnknownSetting(String),
}

// ============================================================================
// SettingDomain
// ============================================================================

/// The accepted range of a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingDomain {
    /// Smallest accepted value
    pub min: u32,
    /// Largest accepted value
    pub max: u32,
    /// Slider step
    pub step: u32,
}

impl SettingDomain {
    /// Clamps a value into `[min, max]`.
    pub fn clamp(&self, value: u32) -> u32 {
        value.clamp(self.min, self.max)
    }

    /// Returns true if the value lies inside the domain.
    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Returns the domain of a setting.
pub fn domain(setting: Setting) -> SettingDomain {
    match setting {
        Setting::Sets => SettingDomain {
            min: 1,
            max: 30,
            step: 1,
        },
        Setting::Work => SettingDomain {
            min: 5,
            max: 1800,
            step: 5,
        },
        Setting::Rest => SettingDomain {
            min: 0,
            max: 1800,
            step: 5,
        },
    }
}

/// A proposed value after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampedValue {
    /// The value to apply
    pub value: u32,
    /// True if the proposed value was outside the domain
    pub adjusted: bool,
}

/// Clamps a proposed value for a setting into its domain.
pub fn clamp(setting: Setting, proposed: u32) -> ClampedValue {
    let value = domain(setting).clamp(proposed);
    ClampedValue {
        value,
        adjusted: value != proposed,
    }
}

/// Clamps a proposed value against the session in progress.
///
/// `sets` never drops below the set currently shown, so the counter stays
/// inside `1..=sets`.
pub fn clamp_for_state(setting: Setting, proposed: u32, state: &TimerState) -> ClampedValue {
    let clamped = clamp(setting, proposed);
    if setting == Setting::Sets && clamped.value < state.current_set {
        return ClampedValue {
            value: state.current_set,
            adjusted: true,
        };
    }
    clamped
}

/// Clamps every field of a configuration into its domain.
pub fn clamp_config(config: SessionConfig) -> SessionConfig {
    Setting::ALL.iter().fold(config, |config, &setting| {
        let value = clamp(setting, config.get(setting)).value;
        config.with(setting, value)
    })
}

/// Returns every setting with its current value and domain.
pub fn setting_views(config: &SessionConfig) -> Vec<SettingView> {
    Setting::ALL
        .iter()
        .map(|&setting| {
            let domain = domain(setting);
            SettingView {
                setting,
                label: setting.label().to_string(),
                value: config.get(setting),
                min: domain.min,
                max: domain.max,
                step: domain.step,
            }
        })
        .collect()
}

/// Total session duration in seconds: `(work + rest) × sets`.
pub fn total_duration(config: &SessionConfig) -> u32 {
    if config.sets == 0 {
        return 0;
    }
    config
        .work_seconds
        .saturating_add(config.rest_seconds)
        .saturating_mul(config.sets)
}

// ============================================================================
// Formatting
// ============================================================================

/// Formats seconds as zero-padded `MM:SS`.
pub fn format_time(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Parses a setting name as typed on the command line.
pub fn parse_setting(s: &str) -> Result<Setting, SettingsError> {
    match s.to_ascii_lowercase().as_str() {
        "sets" | "set" => Ok(Setting::Sets),
        "work" | "workout" | "work-time" => Ok(Setting::Work),
        "rest" | "rest-time" => Ok(Setting::Rest),
        _ => Err(SettingsError::UnknownSetting(s.to_string())),
    }
}

/// Parses a value given either as plain seconds or as `MM:SS`.
pub fn parse_duration(s: &str) -> Result<u32, SettingsError> {
    let s = s.trim();
    let invalid = || SettingsError::InvalidValue(s.to_string());

    match s.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
            let seconds: u32 = seconds.parse().map_err(|_| invalid())?;
            if seconds >= 60 {
                return Err(SettingsError::SecondsOutOfRange(s.to_string()));
            }
            minutes
                .checked_mul(60)
                .and_then(|m| m.checked_add(seconds))
                .ok_or_else(invalid)
        }
        None => s.parse().map_err(|_| invalid()),
    }
}

/// Parses a value for `setting`: a plain count for `sets`, seconds or
/// `MM:SS` for durations.
pub fn parse_value(setting: Setting, s: &str) -> Result<u32, SettingsError> {
    if setting.is_duration() {
        return parse_duration(s);
    }
    let s = s.trim();
    if s.contains(':') {
        return Err(SettingsError::CountExpected(s.to_string()));
    }
    s.parse()
        .map_err(|_| SettingsError::InvalidValue(s.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod domain_tests {
        use super::*;

        #[test]
        fn test_domains() {
            assert_eq!(
                domain(Setting::Sets),
                SettingDomain {
                    min: 1,
                    max: 30,
                    step: 1
                }
            );
            assert_eq!(domain(Setting::Work).min, 5);
            assert_eq!(domain(Setting::Work).max, 1800);
            assert_eq!(domain(Setting::Rest).min, 0);
            assert_eq!(domain(Setting::Rest).step, 5);
        }

        #[test]
        fn test_clamp_inside_domain_is_untouched() {
            let clamped = clamp(Setting::Work, 40);
            assert_eq!(clamped.value, 40);
            assert!(!clamped.adjusted);
        }

        #[test]
        fn test_clamp_below_min() {
            let clamped = clamp(Setting::Sets, 0);
            assert_eq!(clamped.value, 1);
            assert!(clamped.adjusted);

            assert_eq!(clamp(Setting::Work, 2).value, 5);
        }

        #[test]
        fn test_clamp_above_max() {
            assert_eq!(clamp(Setting::Sets, 31).value, 30);
            assert_eq!(clamp(Setting::Rest, 5000).value, 1800);
        }

        #[test]
        fn test_rest_zero_is_valid() {
            let clamped = clamp(Setting::Rest, 0);
            assert_eq!(clamped.value, 0);
            assert!(!clamped.adjusted);
            assert!(domain(Setting::Rest).contains(0));
        }

        #[test]
        fn test_clamp_sets_keeps_current_set() {
            let state = TimerState {
                current_set: 3,
                ..TimerState::default()
            };

            let clamped = clamp_for_state(Setting::Sets, 1, &state);
            assert_eq!(clamped.value, 3);
            assert!(clamped.adjusted);

            let clamped = clamp_for_state(Setting::Sets, 5, &state);
            assert_eq!(clamped.value, 5);
            assert!(!clamped.adjusted);
        }

        #[test]
        fn test_clamp_for_state_leaves_durations_alone() {
            let state = TimerState {
                current_set: 3,
                ..TimerState::default()
            };
            assert_eq!(clamp_for_state(Setting::Rest, 0, &state).value, 0);
            assert_eq!(clamp_for_state(Setting::Work, 2, &state).value, 5);
        }

        #[test]
        fn test_clamp_config() {
            let config = clamp_config(SessionConfig {
                sets: 99,
                work_seconds: 1,
                rest_seconds: 10,
            });
            assert_eq!(config.sets, 30);
            assert_eq!(config.work_seconds, 5);
            assert_eq!(config.rest_seconds, 10);
        }

        #[test]
        fn test_setting_views() {
            let views = setting_views(&SessionConfig::default());
            assert_eq!(views.len(), 3);
            assert_eq!(views[0].setting, Setting::Sets);
            assert_eq!(views[0].value, 3);
            assert_eq!(views[1].label, "WORK OUT");
            assert_eq!(views[1].value, 25);
            assert_eq!(views[2].max, 1800);
        }
    }

    mod total_duration_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            assert_eq!(total_duration(&SessionConfig::default()), 105);
        }

        #[test]
        fn test_single_set_without_rest() {
            let config = SessionConfig {
                sets: 1,
                work_seconds: 5,
                rest_seconds: 0,
            };
            assert_eq!(total_duration(&config), 5);
        }

        #[test]
        fn test_zero_sets() {
            let config = SessionConfig::default().with_sets(0);
            assert_eq!(total_duration(&config), 0);
        }
    }

    mod format_tests {
        use super::*;

        #[test]
        fn test_format_time() {
            assert_eq!(format_time(0), "00:00");
            assert_eq!(format_time(25), "00:25");
            assert_eq!(format_time(105), "01:45");
            assert_eq!(format_time(1800), "30:00");
            assert_eq!(format_time(108_000), "1800:00");
        }

        #[test]
        fn test_parse_duration_seconds() {
            assert_eq!(parse_duration("45"), Ok(45));
            assert_eq!(parse_duration(" 0 "), Ok(0));
        }

        #[test]
        fn test_parse_duration_minutes_seconds() {
            assert_eq!(parse_duration("1:30"), Ok(90));
            assert_eq!(parse_duration("00:05"), Ok(5));
        }

        #[test]
        fn test_parse_duration_invalid() {
            assert!(matches!(
                parse_duration("abc"),
                Err(SettingsError::InvalidValue(_))
            ));
            assert!(matches!(
                parse_duration("1:75"),
                Err(SettingsError::SecondsOutOfRange(_))
            ));
            assert!(parse_duration("-5").is_err());
        }

        #[test]
        fn test_parse_value_sets_is_a_count() {
            assert_eq!(parse_value(Setting::Sets, "4"), Ok(4));
            assert_eq!(
                parse_value(Setting::Sets, "1:00"),
                Err(SettingsError::CountExpected("1:00".to_string()))
            );
            assert!(matches!(
                parse_value(Setting::Sets, "many"),
                Err(SettingsError::InvalidValue(_))
            ));
        }

        #[test]
        fn test_parse_value_durations_accept_minutes() {
            assert_eq!(parse_value(Setting::Work, "1:00"), Ok(60));
            assert_eq!(parse_value(Setting::Rest, "15"), Ok(15));
        }

        #[test]
        fn test_parse_setting() {
            assert_eq!(parse_setting("sets"), Ok(Setting::Sets));
            assert_eq!(parse_setting("WORK"), Ok(Setting::Work));
            assert_eq!(parse_setting("rest"), Ok(Setting::Rest));
            assert!(parse_setting("warmup").is_err());
        }
    }
}
