//! Error types for the server binary.

/// Top-level error for the server binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: tally_core::ConfigError,
    },

    /// A storage backend could not be built.
    #[error("storage error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: tally_store::StoreError,
    },

    /// Application state could not be assembled.
    #[error("web error: {source}")]
    Web {
        /// The underlying web error.
        #[from]
        source: tally_web::WebError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: tally_web::ServerError,
    },
}
