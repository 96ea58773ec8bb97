//! Common error types for the IDS backend

use thiserror::Error;

/// Common result type for IDS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the IDS services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An upstream store or data feed could not be reached or timed out
    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    /// An upstream feed returned data that does not match the expected shape
    #[error("Malformed upstream data: {0}")]
    MalformedUpstream(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::MalformedUpstream(e.to_string())
        } else {
            Error::Upstream(e.to_string())
        }
    }
}
