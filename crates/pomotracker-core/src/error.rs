//! Core error types for pomotracker-core.
//!
//! Configuration problems are detected eagerly, before any interval starts,
//! so a run that has begun can only fail on I/O.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomotracker-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Schedule parameters that cannot produce a well-formed schedule.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ValidationError),

    /// Configuration file errors
    #[error("configuration file error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parameter validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("pomodoros must be at least 1")]
    ZeroPomodoros,

    /// A duration of zero minutes.
    #[error("{field} must be a positive number of minutes")]
    NonPositiveDuration { field: &'static str },

    #[error("long_break_every must be at least 1")]
    ZeroLongBreakEvery,

    #[error("cycles must be at least 1")]
    ZeroCycles,

    /// More focus intervals (pomodoros times cycles) than one schedule holds.
    #[error("a schedule holds at most {max} pomodoros in total, got {requested}")]
    TooManyPomodoros { requested: u64, max: u32 },
}

/// Configuration-file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to write the configuration file
    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// File exists but is not valid TOML for this schema
    #[error("failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Value does not parse as the key's type
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
