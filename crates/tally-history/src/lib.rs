//! Snapshot history manager for reversible editing.
//!
//! The manager owns two stacks of full-state snapshots and exposes the
//! standard editor semantics over any cloneable state type. It has no
//! knowledge of what the state means, how it is rendered, or where it is
//! persisted; callers invoke it before and after their own mutations.
//!
//! # Architecture
//!
//! - [`snapshot`] -- The [`Snapshot`] type: an immutable deep copy of state.
//! - [`history`] -- The [`History`] struct: undo and redo stacks plus the
//!   optional depth cap ([`HistoryLimit`]).
//!
//! # Contract
//!
//! A mutating caller must follow **push -> mutate -> persist**:
//!
//! 1. [`History::push_undo`] with the state *before* the edit.
//! 2. Mutate the state.
//! 3. Forward the new state to any persistence collaborator.
//!
//! Pushing after mutating would record the wrong "before" image, and
//! persisting before pushing would make the edit irreversible.
//!
//! # Failure Semantics
//!
//! Undo and redo on an empty stack are silent no-ops. No operation in this
//! crate can fail.
//!
//! # Usage
//!
//! ```
//! use tally_history::{History, HistoryLimit};
//!
//! let mut state = vec![0, 0];
//! let mut history = History::new(HistoryLimit::Unbounded);
//!
//! history.push_undo(&state);
//! state[0] = 5;
//! history.push_undo(&state);
//! state[1] = 3;
//!
//! assert!(history.undo(&mut state));
//! assert_eq!(state, [5, 0]);
//! assert!(history.undo(&mut state));
//! assert_eq!(state, [0, 0]);
//! assert!(history.redo(&mut state));
//! assert_eq!(state, [5, 0]);
//! ```

pub mod history;
pub mod snapshot;

// Re-export primary types at crate root.
pub use history::{History, HistoryLimit, HistoryStatus};
pub use snapshot::Snapshot;
