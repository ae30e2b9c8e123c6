//! Error types for editing sessions and the budget ledger.

use tally_types::BoardError;

/// Boxed error from a persistence backend.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by [`EditSession`](crate::EditSession) operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The scoreboard rejected the edit.
    #[error(transparent)]
    Board(#[from] BoardError),

    /// The requested activity is not in the catalog.
    #[error("unknown activity: {0}")]
    UnknownActivity(String),

    /// An activity was applied zero times.
    #[error("activity count must be at least 1")]
    InvalidCount,

    /// A manual adjustment of zero points was requested.
    #[error("adjustment must not be zero")]
    ZeroAdjustment,

    /// The backend failed to load or store the scoreboard.
    ///
    /// When returned from a mutation, the in-memory edit has already been
    /// applied and can be undone.
    #[error("{backend} persistence failed: {source}")]
    Persist {
        /// Backend name (e.g. `json_file`).
        backend: &'static str,
        /// The backend's error.
        source: BackendError,
    },
}

impl SessionError {
    /// Wrap a backend error.
    pub fn persist(backend: &'static str, source: impl Into<BackendError>) -> Self {
        Self::Persist {
            backend,
            source: source.into(),
        }
    }

    /// Whether this error came from the backend rather than the request.
    pub const fn is_persistence(&self) -> bool {
        matches!(self, Self::Persist { .. })
    }
}

/// Errors returned by [`BudgetBook`](crate::BudgetBook) operations.
#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    /// The entry description was empty after trimming.
    #[error("description must not be empty")]
    EmptyDescription,

    /// The entry amount was zero or negative.
    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    /// The backend failed to read or append entries.
    #[error("{backend} persistence failed: {source}")]
    Persist {
        /// Backend name (e.g. `sheets`).
        backend: &'static str,
        /// The backend's error.
        source: BackendError,
    },
}

impl BudgetError {
    /// Wrap a backend error.
    pub fn persist(backend: &'static str, source: impl Into<BackendError>) -> Self {
        Self::Persist {
            backend,
            source: source.into(),
        }
    }

    /// Whether this error came from the backend rather than the request.
    pub const fn is_persistence(&self) -> bool {
        matches!(self, Self::Persist { .. })
    }
}
