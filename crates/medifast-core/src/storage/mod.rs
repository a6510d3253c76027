//! Record store capability and its backends.
//!
//! A [`Store`] is a durable key/JSON map. Engines own disjoint keys (see
//! [`keys`]) and treat the store as a write-through cache: a failed read
//! falls back to the default, a failed write is logged and dropped.

mod config;
pub mod memory;
pub mod sqlite;

pub use config::{BreathingDefaults, CalendarConfig, Config, CuesConfig, FastingConfig, MeditationConfig};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ConfigError, StoreError};

/// Persisted keys. Versioned so a schema change can move to a new key.
pub mod keys {
    pub const MEDITATION_PLAN: &str = "meditation.plan.v1";
    pub const MEDITATION_SESSIONS: &str = "meditation.sessions.v1";
    pub const MEDITATION_STREAKS: &str = "meditation.streaks.v1";
    pub const FASTING_ACTIVE: &str = "fasting.active.v1";
    pub const FASTING_HISTORY: &str = "fasting.history.v1";
    pub const FASTING_STREAKS: &str = "fasting.streaks.v1";
    pub const BREATHING_SETTINGS: &str = "breathing.settings.v1";
    pub const BREATHING_HISTORY: &str = "breathing.history.v1";
    pub const PROFILE: &str = "profile.v1";
}

/// Durable key-keyed JSON storage.
pub trait Store {
    /// `Ok(None)` when the key is absent; `Decode` when the stored bytes are
    /// not JSON.
    fn load(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Overwrite the value at `key`.
    fn save(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError>;

    /// Unconditional, idempotent delete.
    fn remove(&self, key: &str);
}

/// Typed access on top of any [`Store`].
pub trait StoreExt: Store {
    fn load_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.load(key)? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| StoreError::Decode {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn save_as<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_value(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.save(key, &json)
    }

    /// Load `key`, falling back to `T::default()` when absent or unreadable.
    fn restore<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.load_as(key) {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding unreadable stored value");
                T::default()
            }
        }
    }

    /// Best-effort write; failures are logged and swallowed.
    fn persist<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = self.save_as(key, value) {
            tracing::warn!(key, error = %e, "failed to persist value");
        }
    }
}

impl<S: Store + ?Sized> StoreExt for S {}

/// Returns `~/.config/medifast[-dev]/` based on MEDIFAST_ENV.
///
/// Set MEDIFAST_ENV=dev to use the development data directory, or
/// MEDIFAST_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = if let Ok(custom) = std::env::var("MEDIFAST_DATA_DIR") {
        PathBuf::from(custom)
    } else {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config");

        let env = std::env::var("MEDIFAST_ENV").unwrap_or_else(|_| "production".to_string());
        if env == "dev" {
            base_dir.join("medifast-dev")
        } else {
            base_dir.join("medifast")
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}
