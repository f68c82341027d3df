//! Core error types for review-prompt-core.
//!
//! Deciding whether to prompt and recording that a prompt happened fail
//! differently: evaluation errors always reach the caller, while a failed
//! tracking write is logged by [`ReviewService`](crate::ReviewService)
//! and never surfaces.

use std::path::PathBuf;
use thiserror::Error;

/// Error produced by a custom predicate.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Core error type for review-prompt-core.
#[derive(Error, Debug)]
pub enum ReviewError {
    /// The conditions could not be evaluated
    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// A condition, or the settings read feeding it, failed to produce a result.
#[derive(Error, Debug)]
pub enum EvaluationError {
    /// A predicate returned an error instead of an outcome
    #[error("Condition '{name}' failed: {source}")]
    Condition {
        name: String,
        #[source]
        source: BoxError,
    },

    /// Cancellation was observed before evaluation finished
    #[error("Evaluation was cancelled")]
    Cancelled,

    /// The tracked settings could not be read
    #[error("Failed to read review settings: {0}")]
    SettingsRead(#[source] SettingsError),
}

impl From<SettingsError> for EvaluationError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::Cancelled => EvaluationError::Cancelled,
            other => EvaluationError::SettingsRead(other),
        }
    }
}

impl From<SettingsError> for ReviewError {
    fn from(err: SettingsError) -> Self {
        ReviewError::Evaluation(err.into())
    }
}

/// Errors returned by a [`ReviewSettingsSource`](crate::ReviewSettingsSource).
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read/write review settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse review settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize review settings TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Settings operation was cancelled")]
    Cancelled,

    #[error("Failed to access data directory: {0}")]
    DataDir(String),

    /// Host-defined failure from a custom source
    #[error("{0}")]
    Custom(String),
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to locate the data directory
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// Result type alias for ReviewError
pub type Result<T, E = ReviewError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_settings_read_maps_to_cancelled_evaluation() {
        let err: EvaluationError = SettingsError::Cancelled.into();
        assert!(matches!(err, EvaluationError::Cancelled));
    }

    #[test]
    fn test_settings_read_failure_is_an_evaluation_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ReviewError = SettingsError::Io(io).into();
        assert!(matches!(
            err,
            ReviewError::Evaluation(EvaluationError::SettingsRead(SettingsError::Io(_)))
        ));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_condition_error_message_names_condition() {
        let err = EvaluationError::Condition {
            name: "has_network".to_string(),
            source: "offline".into(),
        };
        assert_eq!(err.to_string(), "Condition 'has_network' failed: offline");
    }
}
