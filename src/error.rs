//! Error types for the Pagestats service.

use thiserror::Error;

/// Main error type for Pagestats operations.
#[derive(Error, Debug)]
pub enum PagestatsError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Server(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for PagestatsError {
    fn from(err: config::ConfigError) -> Self {
        PagestatsError::Config(err.to_string())
    }
}

/// Result type alias for Pagestats operations.
pub type Result<T> = std::result::Result<T, PagestatsError>;
