//! Core error types for medifast-core.
//!
//! Session engines never surface storage failures to their callers; these
//! types exist for the storage layer, the config file and the few validated
//! operations (fasting start-time edits, profile forms).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for medifast-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Record store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Errors raised by a [`Store`](crate::storage::Store) backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A value could not be serialized for writing
    #[error("Encoding failed for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Stored bytes do not match the expected schema
    #[error("Decoding failed for '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The underlying storage engine failed
    #[error("Storage backend failed: {0}")]
    Backend(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// The data directory could not be created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
///
/// Each variant names the offending field and renders a message suitable for
/// showing to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No fast is running, so there is no start time to edit
    #[error("There is no active fast to adjust.")]
    NoActiveFast,

    /// The adjusted start time would lie in the future
    #[error("Start time cannot be in the future.")]
    StartInFuture,

    /// The requested shift does not fit in the supported date range
    #[error("That adjustment is out of range.")]
    InvalidOffset,

    #[error("Enter your first name.")]
    MissingFirstName,

    #[error("Enter your last name.")]
    MissingLastName,

    #[error("Enter your email address.")]
    MissingEmail,

    #[error("Enter a valid email address.")]
    InvalidEmail,

    #[error("Enter your weight.")]
    MissingWeight,

    #[error("Enter your height.")]
    MissingHeight,

    #[error("Weight must be a positive number.")]
    InvalidWeight,

    #[error("Height must be a positive number.")]
    InvalidHeight,
}

impl ValidationError {
    /// Name of the form field the violation belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::NoActiveFast
            | ValidationError::StartInFuture
            | ValidationError::InvalidOffset => "start_at",
            ValidationError::MissingFirstName => "given_name",
            ValidationError::MissingLastName => "family_name",
            ValidationError::MissingEmail | ValidationError::InvalidEmail => "email",
            ValidationError::MissingWeight | ValidationError::InvalidWeight => "weight",
            ValidationError::MissingHeight | ValidationError::InvalidHeight => "height",
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_user_facing() {
        assert_eq!(
            ValidationError::StartInFuture.to_string(),
            "Start time cannot be in the future."
        );
        assert_eq!(ValidationError::InvalidEmail.field(), "email");
        assert_eq!(ValidationError::InvalidOffset.field(), "start_at");
    }

    #[test]
    fn store_error_wraps_into_core_error() {
        let err: CoreError = StoreError::Backend("disk full".into()).into();
        assert!(err.to_string().contains("disk full"));
    }
}
