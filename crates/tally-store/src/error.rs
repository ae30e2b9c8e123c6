//! Error types for the persistence backends.
//!
//! All backend failures surface as [`StoreError`], which wraps the
//! underlying I/O, JSON, and HTTP errors and carries the spreadsheet API's
//! status and body for rejected requests.

/// Errors that can occur while loading or saving state.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON document could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The spreadsheet API could not be reached.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The spreadsheet API answered with a non-success status.
    #[error("spreadsheet API returned {status}: {body}")]
    Sheets {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// A backend was selected without the settings it needs.
    #[error("Configuration error: {0}")]
    Config(String),
}
