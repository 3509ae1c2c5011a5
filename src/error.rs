//! Error types for ttlkv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using TtlKvError
pub type Result<T> = std::result::Result<T, TtlKvError>;

/// Unified error type for ttlkv operations
#[derive(Debug, Error)]
pub enum TtlKvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Key not found: {0}")]
    NotFound(String),

    // -------------------------------------------------------------------------
    // Persistence Errors
    // -------------------------------------------------------------------------
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for TtlKvError {
    fn from(err: serde_json::Error) -> Self {
        TtlKvError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for TtlKvError {
    fn from(err: bincode::Error) -> Self {
        TtlKvError::Serialization(err.to_string())
    }
}

impl TtlKvError {
    /// Whether this error came from a snapshot backend rather than the caller
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            TtlKvError::Persistence(_)
                | TtlKvError::Database(_)
                | TtlKvError::Serialization(_)
                | TtlKvError::Io(_)
        )
    }
}
