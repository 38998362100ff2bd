//! Error types for tally-core

use thiserror::Error;

/// Main error type for the tally-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Event not found
    #[error("event not found: {0}")]
    EventNotFound(String),

    /// Record not found
    #[error("record not found: {0}")]
    RecordNotFound(i64),

    /// Mirror/API error
    #[error("mirror error: {0}")]
    Mirror(String),
}

/// Result type alias for tally-core
pub type Result<T> = std::result::Result<T, Error>;
