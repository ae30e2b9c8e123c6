//! Shared type definitions for the Tally workspace.
//!
//! This crate is the single source of truth for the data that flows between
//! the history manager, the editing session, the persistence backends, and
//! the web layer.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for sessions and budget entries
//! - [`scoreboard`] -- The editable application state: categories of
//!   participant point totals
//! - [`budget`] -- Income/expense entries and their summary
//! - [`view`] -- Read-only projections served to clients

pub mod budget;
pub mod ids;
pub mod scoreboard;
pub mod view;

// Re-export all public types at crate root for convenience.
pub use budget::{BudgetEntry, BudgetSummary, EntryKind, ParseEntryKindError};
pub use ids::{EntryId, SessionId};
pub use scoreboard::{BoardError, Category, Scoreboard, Standing};
pub use view::{BoardView, HistoryView};
