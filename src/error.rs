//! Error types for the chat widget.

use thiserror::Error;

/// Widget error type.
#[derive(Error, Debug)]
pub enum Error {
    /// The request never completed (unreachable host, DNS, TLS, timeout).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Server error ({status})")]
    Server {
        /// HTTP status code.
        status: u16,
    },

    /// The response body was not valid JSON.
    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Local storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Failure of a [`LocalStorage`](crate::session::LocalStorage) backend.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backing file could not be read or written.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but does not hold a JSON object of strings.
    #[error("storage contents are corrupt: {0}")]
    Corrupt(String),

    /// The backend refuses all access.
    #[error("storage is unavailable")]
    Unavailable,
}

/// Result type alias for widget operations.
pub type Result<T> = std::result::Result<T, Error>;
