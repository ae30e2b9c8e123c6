//! Editing sessions, configuration, and budget rules for Tally.
//!
//! This crate sits between the history manager and the outer surfaces. It
//! knows what a scoreboard edit *means* (apply an activity, clear a
//! category) and enforces the order every edit must follow, but it does not
//! know how state is stored or rendered.
//!
//! # Modules
//!
//! - [`config`] -- `tally-config.yaml` loading with environment overrides
//! - [`activity`] -- The validated catalog of point-awarding activities
//! - [`persist`] -- Persistence capabilities plus in-memory implementations
//! - [`session`] -- [`EditSession`]: one client's state, history, and store
//! - [`budget`] -- Budget entry validation, summaries, and formatting
//! - [`error`] -- Session and budget error types
//!
//! # Edit Order
//!
//! ```text
//! validate -> push_undo -> mutate -> persist
//! ```
//!
//! A request that fails validation never touches the history, so a typo in
//! a form cannot wipe out redo steps.

pub mod activity;
pub mod budget;
pub mod config;
pub mod error;
pub mod persist;
pub mod session;

// Re-export primary types for convenience.
pub use activity::{Activity, ActivityCatalog};
pub use budget::{BudgetBook, BudgetReport, NewEntry};
pub use config::{ConfigError, TallyConfig};
pub use error::{BudgetError, SessionError};
pub use persist::{BoardPersistence, LedgerPersistence, MemoryBoard, MemoryLedger};
pub use session::{EditOutcome, EditSession, SessionTemplate};
