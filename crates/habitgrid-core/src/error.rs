//! Core error types for habitgrid-core.
//!
//! The engine itself (calendar, requirement, streak and month metrics) never
//! fails: it returns zeroed results instead. Errors only come from the edges,
//! i.e. constructing validated values, loading configuration and the habit
//! store.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for habitgrid-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Habit store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

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

    /// Key does not exist in the configuration tree
    #[error("unknown config key: {0}")]
    UnknownKey(String),
}

/// Habit store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No habit matches the reference
    #[error("no habit matches '{0}'")]
    NotFound(String),

    /// Several habits match an id prefix
    #[error("'{reference}' matches {count} habits, use a longer id")]
    Ambiguous { reference: String, count: usize },

    /// A habit with the same name already exists
    #[error("a habit named '{0}' already exists")]
    DuplicateName(String),

    /// The store file exists but cannot be read back
    #[error("habit store at {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Numeric value outside its allowed range
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Frequency rule that cannot be parsed
    #[error("invalid frequency '{0}', expected daily, per-week:N or days:mon,wed,..")]
    InvalidFrequency(String),

    /// Week bits that are not exactly seven '0'/'1' characters
    #[error("invalid week bits '{0}', expected 7 characters of '0' or '1'")]
    InvalidWeekBits(String),

    /// Chunk key that is not "YYYY-MM"
    #[error("invalid chunk key '{0}', expected YYYY-MM")]
    InvalidChunkKey(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
