//! Error types for the resurface engine
//!
//! This module provides comprehensive error handling using thiserror for
//! structured error definitions and anyhow for error propagation.

use thiserror::Error;

/// Main error type for resurface operations
#[derive(Error, Debug)]
pub enum ResurfaceError {
    /// Page context could not be extracted (no page loaded, content too short)
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Content repository operation failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored item could not be scored (malformed fields)
    #[error("Scoring error: {0}")]
    Scoring(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid identifier format
    #[error("Invalid identifier: {0}")]
    InvalidId(#[from] uuid::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid operation (e.g., interaction against a completed session)
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for resurface operations
pub type Result<T> = std::result::Result<T, ResurfaceError>;

/// Convert anyhow::Error to ResurfaceError
impl From<anyhow::Error> for ResurfaceError {
    fn from(err: anyhow::Error) -> Self {
        ResurfaceError::Other(err.to_string())
    }
}
