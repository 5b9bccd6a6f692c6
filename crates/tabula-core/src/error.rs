//! Error types for Tabula

use thiserror::Error;

/// Core error type shared by the persistence contracts
#[derive(Error, Debug)]
pub enum TabulaError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Tabula operations
pub type Result<T> = std::result::Result<T, TabulaError>;
