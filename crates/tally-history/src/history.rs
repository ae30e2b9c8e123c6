//! Undo and redo stacks of state snapshots.
//!
//! [`History`] is a plain, single-owner value: it performs no locking and
//! must not be shared between concurrent mutators without an external
//! mutex. An editing session owns exactly one.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

use crate::snapshot::Snapshot;

/// Maximum number of snapshots kept on each stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryLimit {
    /// Stacks grow without bound.
    #[default]
    Unbounded,
    /// Each stack keeps at most this many snapshots; pushing onto a full
    /// stack evicts its oldest snapshot.
    Depth(NonZeroUsize),
}

impl HistoryLimit {
    /// Build a limit from a configured depth, where `0` means unbounded.
    pub const fn from_depth(depth: usize) -> Self {
        match NonZeroUsize::new(depth) {
            Some(depth) => Self::Depth(depth),
            None => Self::Unbounded,
        }
    }

    /// The cap as a plain number, if any.
    pub const fn depth(self) -> Option<usize> {
        match self {
            Self::Unbounded => None,
            Self::Depth(depth) => Some(depth.get()),
        }
    }
}

/// Coarse state of a history manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryStatus {
    /// Nothing to undo.
    Empty,
    /// At least one undo step is available.
    HasHistory,
}

/// Two-stack snapshot history.
///
/// - [`push_undo`](Self::push_undo) records the "before" image of an edit
///   and invalidates redo history.
/// - [`undo`](Self::undo) and [`redo`](Self::redo) swap the live state with
///   the top of the respective stack, moving the displaced state onto the
///   opposite stack. Neither clears the other stack.
#[derive(Debug, Clone)]
pub struct History<S> {
    undo: VecDeque<Snapshot<S>>,
    redo: VecDeque<Snapshot<S>>,
    limit: HistoryLimit,
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self::new(HistoryLimit::default())
    }
}

impl<S> History<S> {
    /// Create an empty history with the given depth cap.
    pub const fn new(limit: HistoryLimit) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            limit,
        }
    }

    /// The configured depth cap.
    pub const fn limit(&self) -> HistoryLimit {
        self.limit
    }

    /// Whether [`undo`](Self::undo) would change anything.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether [`redo`](Self::redo) would change anything.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of snapshots on the undo stack.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Number of snapshots on the redo stack.
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Coarse state: empty or has undo history.
    pub fn status(&self) -> HistoryStatus {
        if self.undo.is_empty() {
            HistoryStatus::Empty
        } else {
            HistoryStatus::HasHistory
        }
    }

    /// The snapshot the next undo would restore.
    pub fn peek_undo(&self) -> Option<&S> {
        self.undo.back().map(Snapshot::state)
    }

    /// The snapshot the next redo would restore.
    pub fn peek_redo(&self) -> Option<&S> {
        self.redo.back().map(Snapshot::state)
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        tracing::debug!("History cleared");
    }

    /// Restore the most recent "before" image.
    ///
    /// The current state moves onto the redo stack and the top undo
    /// snapshot is installed into `current`. Returns `false` and leaves
    /// everything untouched when there is nothing to undo.
    pub fn undo(&mut self, current: &mut S) -> bool {
        let Some(previous) = self.undo.pop_back() else {
            tracing::debug!("Undo ignored: undo stack empty");
            return false;
        };

        let displaced = std::mem::replace(current, previous.into_inner());
        push_bounded(&mut self.redo, Snapshot::from_owned(displaced), self.limit);

        tracing::debug!(
            undo_depth = self.undo.len(),
            redo_depth = self.redo.len(),
            "Undo"
        );
        true
    }

    /// Re-apply the most recently undone state.
    ///
    /// Mirror of [`undo`](Self::undo): the current state moves onto the undo
    /// stack and the top redo snapshot is installed into `current`.
    pub fn redo(&mut self, current: &mut S) -> bool {
        let Some(next) = self.redo.pop_back() else {
            tracing::debug!("Redo ignored: redo stack empty");
            return false;
        };

        let displaced = std::mem::replace(current, next.into_inner());
        push_bounded(&mut self.undo, Snapshot::from_owned(displaced), self.limit);

        tracing::debug!(
            undo_depth = self.undo.len(),
            redo_depth = self.redo.len(),
            "Redo"
        );
        true
    }
}

impl<S: Clone> History<S> {
    /// Record a deep copy of `current` as the "before" image of an edit.
    ///
    /// Always clears the redo stack, even when the push evicts an old
    /// snapshot.
    pub fn push_undo(&mut self, current: &S) {
        self.redo.clear();
        push_bounded(&mut self.undo, Snapshot::capture(current), self.limit);

        tracing::debug!(undo_depth = self.undo.len(), "History snapshot pushed");
    }
}

/// Push onto `stack`, evicting from the bottom to respect `limit`.
fn push_bounded<S>(stack: &mut VecDeque<Snapshot<S>>, snapshot: Snapshot<S>, limit: HistoryLimit) {
    stack.push_back(snapshot);
    if let HistoryLimit::Depth(depth) = limit {
        while stack.len() > depth.get() {
            stack.pop_front();
            tracing::trace!(depth = depth.get(), "Evicted oldest snapshot");
        }
    }
}
