//! Error types for callcheck operations
//!
//! A detected conflict is never an error; it is reported through
//! [`ConflictReport`](crate::ConflictReport).

use crate::CallId;
use thiserror::Error;

/// Record source and sink errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Record source not found: {path}")]
    NotFound { path: String },

    #[error("Record source unavailable: {path}: {reason}")]
    SourceUnavailable { path: String, reason: String },

    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("Write failed for {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Timeline violation for agent {agent} between calls {first} and {second}: {reason}")]
    TimelineViolation {
        agent: String,
        first: CallId,
        second: CallId,
        reason: String,
    },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all callcheck errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CallcheckError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for callcheck operations.
pub type CallcheckResult<T> = Result<T, CallcheckError>;

// =============================================================================
// TESTS
// =============================================================================
