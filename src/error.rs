//! Error types for planq
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in planq
#[derive(Debug, Error)]
pub enum PlanqError {
    /// Persistence failure; carries the operation name and offending key
    /// so callers can log and abort that unit of work.
    #[error("Store error during {op} ({key}): {source}")]
    Store {
        op: &'static str,
        key: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Failure opening or migrating the backing database file
    #[error("Failed to open store at {path}: {source}")]
    StoreOpen {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A persisted timestamp could not be interpreted
    #[error("Corrupt timestamp in store: {0}")]
    CorruptTimestamp(i64),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlanqError {
    /// Wrap a rusqlite error with the operation and key it occurred on.
    pub fn store(op: &'static str, key: impl Into<String>, source: rusqlite::Error) -> Self {
        PlanqError::Store {
            op,
            key: key.into(),
            source,
        }
    }
}

/// Result type alias for planq operations
pub type Result<T> = std::result::Result<T, PlanqError>;
