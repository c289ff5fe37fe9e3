//! Error types for the scraper crate

use thiserror::Error;

/// Result type for scraper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for scraper operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error (connection refused, DNS, body read...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request did not complete within the configured timeout
    #[error("Request to {url} timed out")]
    Timeout {
        /// URL that was being fetched
        url: String,
    },

    /// A listing page returned a non-success status
    #[error("Unexpected status {status_code} from {url}")]
    Status {
        /// HTTP status code
        status_code: u16,
        /// URL that was fetched
        url: String,
    },

    /// The film page did not return a success status
    #[error("Film '{slug}' not found (status {status_code})")]
    NotFound {
        /// Film slug
        slug: String,
        /// HTTP status code
        status_code: u16,
    },

    /// The film page has no embedded JSON-LD block
    #[error("Movie data not found on the page for '{slug}'")]
    MissingData {
        /// Film slug
        slug: String,
    },

    /// The JSON-LD block could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// A CSS selector failed to parse
    #[error("Selector error: {0}")]
    Selector(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error while writing output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error while writing output
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Delimited output could not be written
    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Whether this error came from the transport layer (network, timeout or bad status)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::Timeout { .. } | Error::Status { .. } | Error::NotFound { .. }
        )
    }
}
