//! Read-only projections of an editing session served to clients.

use serde::{Deserialize, Serialize};

use crate::ids::SessionId;
use crate::scoreboard::Scoreboard;

/// Undo/redo availability for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryView {
    /// Whether an undo step is available.
    pub can_undo: bool,
    /// Whether a redo step is available.
    pub can_redo: bool,
    /// Number of snapshots on the undo stack.
    pub undo_depth: usize,
    /// Number of snapshots on the redo stack.
    pub redo_depth: usize,
}

/// A session's current board plus its history status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardView {
    /// The session this view belongs to.
    pub session_id: SessionId,
    /// Page title from configuration.
    pub title: String,
    /// Current application state.
    pub board: Scoreboard,
    /// Undo/redo availability.
    pub history: HistoryView,
}
