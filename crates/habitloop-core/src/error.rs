//! Core error types for habitloop-core.
//!
//! Validation errors are raised before any store call; store errors abort
//! the triggering operation; backend (notification) errors are never
//! propagated past the reminder manager, which degrades them to no-ops.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for habitloop-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Habit store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors raised while validating habit input, before any store call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Title is empty or whitespace-only
    #[error("Habit title must not be empty")]
    EmptyTitle,

    /// Title exceeds the maximum length
    #[error("Habit title is {len} characters (max {max})")]
    TitleTooLong { len: usize, max: usize },

    /// Description exceeds the maximum length
    #[error("Habit description is {len} characters (max {max})")]
    DescriptionTooLong { len: usize, max: usize },

    /// Reminder time string is not HH:MM in 24-hour form
    #[error("Invalid reminder time '{0}': expected HH:MM in 24-hour form")]
    InvalidReminderTime(String),

    /// Icon identifier is not in the supported set
    #[error("Unknown icon identifier: '{0}'")]
    UnknownIcon(String),

    /// Color is not in the habit palette
    #[error("Unknown habit color: '{0}'")]
    UnknownColor(String),

    /// Frequency string is not daily/weekly/custom
    #[error("Unknown frequency: '{0}'")]
    UnknownFrequency(String),
}

/// Habit store errors. Fatal to the user action that triggered them.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the local database
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Local database is locked
    #[error("Database is locked")]
    Locked,

    /// No habit exists with the given id
    #[error("Habit not found: {0}")]
    NotFound(String),

    /// Remote backend is unreachable or the request failed in transit
    #[error("Remote request failed: {0}")]
    Connection(#[from] reqwest::Error),

    /// Remote backend rejected the request
    #[error("Remote API returned {status}: {message}")]
    Remote { status: u16, message: String },

    /// Remote base URL could not be parsed
    #[error("Invalid remote base URL: {0}")]
    InvalidBaseUrl(String),
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

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Notification backend errors. Swallowed by the reminder manager and
/// surfaced only as a `ScheduleOutcome` / log line, never to the user.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Platform does not support local notification scheduling
    #[error("Platform does not support local notification scheduling")]
    Unsupported,

    /// The notification registry could not be read or written
    #[error("Notification registry error: {0}")]
    Registry(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for BackendError {
    fn from(err: rusqlite::Error) -> Self {
        BackendError::Registry(err.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
