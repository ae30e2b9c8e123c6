//! Immutable deep copies of editable state.

/// A full copy of some state at one moment.
///
/// Snapshots are only created by copying (or by taking ownership of a
/// displaced value), so a snapshot never aliases live state. Once inside a
/// [`History`](crate::History) it can only be read or moved back out.
#[derive(Debug, Clone)]
pub struct Snapshot<S> {
    state: S,
}

impl<S: Clone> Snapshot<S> {
    /// Deep-copy `state` into a new snapshot.
    pub fn capture(state: &S) -> Self {
        Self::from_owned(state.clone())
    }
}

impl<S> Snapshot<S> {
    /// Wrap a value the caller no longer needs.
    pub(crate) const fn from_owned(state: S) -> Self {
        Self { state }
    }

    /// Borrow the captured state.
    pub const fn state(&self) -> &S {
        &self.state
    }

    /// Consume the snapshot and return the captured state.
    pub fn into_inner(self) -> S {
        self.state
    }
}
