//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Meditation defaults and the minutes-as-seconds test mode
//! - Breathing defaults used when no settings were saved yet
//! - The default fasting history filter
//! - Whether the terminal plays bells / prints haptic markers
//! - Calendar rules for streaks and weekly grouping
//!
//! Configuration is stored at `~/.config/medifast/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::breathing::BreathingSettings;
use crate::clock::{Calendar, WeekStart};
use crate::error::ConfigError;

/// Meditation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeditationConfig {
    /// Interpret plan minutes as seconds. Handy for trying out a plan.
    #[serde(default)]
    pub test_mode: bool,
    #[serde(default = "default_minutes")]
    pub default_minutes: u32,
}

/// Breathing defaults, used until the user saves their own settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreathingDefaults {
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    #[serde(default = "default_breaths")]
    pub breaths_per_round: u32,
    #[serde(default = "default_recovery")]
    pub recovery_hold_secs: u32,
    #[serde(default = "default_pace")]
    pub pace_secs: u32,
}

/// Fasting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FastingConfig {
    /// Minimum hours preselected in the history filter (0 = all).
    #[serde(default)]
    pub default_filter_hours: f64,
}

/// Cue output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuesConfig {
    #[serde(default = "default_true")]
    pub sound: bool,
    #[serde(default = "default_true")]
    pub haptics: bool,
}

/// Calendar configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default)]
    pub week_start: WeekStart,
    /// Use UTC days instead of the local time zone.
    #[serde(default)]
    pub utc: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/medifast/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub meditation: MeditationConfig,
    #[serde(default)]
    pub breathing: BreathingDefaults,
    #[serde(default)]
    pub fasting: FastingConfig,
    #[serde(default)]
    pub cues: CuesConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

// Default functions
fn default_minutes() -> u32 {
    10
}
fn default_rounds() -> u32 {
    3
}
fn default_breaths() -> u32 {
    30
}
fn default_recovery() -> u32 {
    15
}
fn default_pace() -> u32 {
    3
}
fn default_true() -> bool {
    true
}

impl Default for MeditationConfig {
    fn default() -> Self {
        Self {
            test_mode: false,
            default_minutes: default_minutes(),
        }
    }
}

impl Default for BreathingDefaults {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
            breaths_per_round: default_breaths(),
            recovery_hold_secs: default_recovery(),
            pace_secs: default_pace(),
        }
    }
}

impl Default for FastingConfig {
    fn default() -> Self {
        Self {
            default_filter_hours: 0.0,
        }
    }
}

impl Default for CuesConfig {
    fn default() -> Self {
        Self {
            sound: true,
            haptics: true,
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            week_start: WeekStart::Monday,
            utc: false,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Set a config value in memory only.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Calendar rules derived from the `[calendar]` table.
    pub fn calendar(&self) -> Calendar {
        let base = if self.calendar.utc {
            Calendar::utc()
        } else {
            Calendar::local()
        };
        base.with_week_start(self.calendar.week_start)
    }

    /// Seconds in one plan "minute".
    pub fn minute_secs(&self) -> u32 {
        if self.meditation.test_mode {
            1
        } else {
            60
        }
    }

    /// Breathing settings to offer before any have been saved.
    pub fn breathing_settings(&self) -> BreathingSettings {
        BreathingSettings::new(
            self.breathing.rounds,
            self.breathing.breaths_per_round,
            self.breathing.recovery_hold_secs,
            self.breathing.pace_secs,
        )
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert!(!parsed.meditation.test_mode);
        assert_eq!(parsed.breathing.pace_secs, 3);
        assert_eq!(parsed.calendar.week_start, WeekStart::Monday);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[meditation]\ntest_mode = true\n").unwrap();
        assert!(parsed.meditation.test_mode);
        assert_eq!(parsed.meditation.default_minutes, 10);
        assert!(parsed.cues.sound);
        assert_eq!(parsed.minute_secs(), 1);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("cues.sound").as_deref(), Some("true"));
        assert_eq!(cfg.get("breathing.rounds").as_deref(), Some("3"));
        assert_eq!(cfg.get("calendar.week_start").as_deref(), Some("monday"));
        assert!(cfg.get("cues.missing_key").is_none());
    }

    #[test]
    fn apply_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.apply("cues.haptics", "false").unwrap();
        cfg.apply("fasting.default_filter_hours", "16").unwrap();
        cfg.apply("calendar.week_start", "sunday").unwrap();
        assert!(!cfg.cues.haptics);
        assert_eq!(cfg.fasting.default_filter_hours, 16.0);
        assert_eq!(cfg.calendar().week_start(), WeekStart::Sunday);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("cues.nonexistent_key", "value"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.apply("cues.sound", "not_a_bool").is_err());
        assert!(cfg.apply("calendar.week_start", "friday").is_err());
        assert!(cfg.cues.sound);
    }
}
