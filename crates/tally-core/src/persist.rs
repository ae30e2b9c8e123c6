//! Persistence capabilities for the scoreboard and the budget ledger.
//!
//! Sessions and the budget book are generic over these traits; concrete
//! backends (JSON file, spreadsheet, cached spreadsheet) live in the
//! `tally-store` crate. The in-memory implementations here are the
//! default for tests and for `storage.backend: memory`.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use tally_types::{BudgetEntry, Scoreboard};
use tokio::sync::Mutex;

/// Durably store and later retrieve the current scoreboard.
pub trait BoardPersistence: Send + Sync {
    /// Backend-specific failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Short backend name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Load the stored scoreboard, or `None` when nothing was stored yet.
    fn load(&self) -> impl Future<Output = Result<Option<Scoreboard>, Self::Error>> + Send;

    /// Replace the stored scoreboard.
    fn save(&self, board: &Scoreboard) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Append-only storage for budget entries.
pub trait LedgerPersistence: Send + Sync {
    /// Backend-specific failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Short backend name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Every stored entry, in insertion order.
    fn list(&self) -> impl Future<Output = Result<Vec<BudgetEntry>, Self::Error>> + Send;

    /// Store one more entry.
    fn append(&self, entry: &BudgetEntry) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

impl<T: BoardPersistence> BoardPersistence for Arc<T> {
    type Error = T::Error;

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn load(&self) -> impl Future<Output = Result<Option<Scoreboard>, Self::Error>> + Send {
        (**self).load()
    }

    fn save(&self, board: &Scoreboard) -> impl Future<Output = Result<(), Self::Error>> + Send {
        (**self).save(board)
    }
}

impl<T: LedgerPersistence> LedgerPersistence for Arc<T> {
    type Error = T::Error;

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn list(&self) -> impl Future<Output = Result<Vec<BudgetEntry>, Self::Error>> + Send {
        (**self).list()
    }

    fn append(&self, entry: &BudgetEntry) -> impl Future<Output = Result<(), Self::Error>> + Send {
        (**self).append(entry)
    }
}

// ---------------------------------------------------------------------------
// In-memory backends
// ---------------------------------------------------------------------------

/// Process-local scoreboard storage.
#[derive(Debug, Default)]
pub struct MemoryBoard {
    board: Mutex<Option<Scoreboard>>,
    saves: Mutex<usize>,
}

impl MemoryBoard {
    /// Empty storage: `load` returns `None` until the first save.
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with a board.
    pub fn with_board(board: Scoreboard) -> Self {
        Self {
            board: Mutex::new(Some(board)),
            saves: Mutex::new(0),
        }
    }

    /// Number of successful saves so far.
    pub async fn save_count(&self) -> usize {
        *self.saves.lock().await
    }
}

impl BoardPersistence for MemoryBoard {
    type Error = Infallible;

    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self) -> Result<Option<Scoreboard>, Infallible> {
        Ok(self.board.lock().await.clone())
    }

    async fn save(&self, board: &Scoreboard) -> Result<(), Infallible> {
        *self.board.lock().await = Some(board.clone());
        let mut saves = self.saves.lock().await;
        *saves = saves.saturating_add(1);
        Ok(())
    }
}

/// Process-local budget ledger.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Mutex<Vec<BudgetEntry>>,
}

impl MemoryLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerPersistence for MemoryLedger {
    type Error = Infallible;

    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list(&self) -> Result<Vec<BudgetEntry>, Infallible> {
        Ok(self.entries.lock().await.clone())
    }

    async fn append(&self, entry: &BudgetEntry) -> Result<(), Infallible> {
        self.entries.lock().await.push(entry.clone());
        Ok(())
    }
}
