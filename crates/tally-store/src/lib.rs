//! Persistence backends for Tally scoreboards and budget ledgers.
//!
//! Each backend implements the persistence traits from `tally-core`. The
//! [`BoardStore`] and [`LedgerStore`] enums dispatch to the backend chosen
//! in configuration, so the web layer works with one concrete type.
//!
//! # Backends
//!
//! ```text
//! storage.backend
//!     |
//!     +-- memory         --> MemoryBoard           (process only)
//!     +-- json_file      --> JsonBoardFile         (local document)
//!     +-- sheets         --> SheetsBoard           (values API)
//!     +-- cached_sheets  --> CachedBoard<SheetsBoard>
//! ```
//!
//! # Modules
//!
//! - [`json_file`] -- Local JSON documents with temp-file-then-rename writes
//! - [`sheets`] -- Spreadsheet values API client and row codecs
//! - [`cached`] -- TTL read cache in front of another backend
//! - [`error`] -- Shared error type

pub mod cached;
pub mod error;
pub mod json_file;
pub mod sheets;

use std::time::Duration;

use tally_core::config::{BoardBackend, LedgerBackend};
use tally_core::{BoardPersistence, LedgerPersistence, MemoryBoard, MemoryLedger, TallyConfig};
use tally_types::{BudgetEntry, Scoreboard};

// Re-export primary types for convenience.
pub use cached::CachedBoard;
pub use error::StoreError;
pub use json_file::{JsonBoardFile, JsonLedgerFile};
pub use sheets::{SheetsBoard, SheetsClient, SheetsLedger};

/// The configured scoreboard backend.
#[derive(Debug)]
pub enum BoardStore {
    /// In-process only.
    Memory(MemoryBoard),
    /// Local JSON document.
    JsonFile(JsonBoardFile),
    /// Spreadsheet range.
    Sheets(SheetsBoard),
    /// Spreadsheet range behind a read cache.
    CachedSheets(Box<CachedBoard<SheetsBoard>>),
}

impl BoardStore {
    /// Build the backend selected by `storage.backend`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] or [`StoreError::Http`] when a
    /// spreadsheet client cannot be built.
    pub fn from_config(config: &TallyConfig) -> Result<Self, StoreError> {
        let store = match config.storage.backend {
            BoardBackend::Memory => Self::Memory(MemoryBoard::new()),
            BoardBackend::JsonFile => Self::JsonFile(JsonBoardFile::new(&config.storage.json_path)),
            BoardBackend::Sheets => Self::Sheets(SheetsBoard::new(
                SheetsClient::new(&config.sheets)?,
                &config.sheets.scores_range,
            )),
            BoardBackend::CachedSheets => Self::CachedSheets(Box::new(CachedBoard::new(
                SheetsBoard::new(SheetsClient::new(&config.sheets)?, &config.sheets.scores_range),
                Duration::from_secs(config.sheets.cache_ttl_secs),
            ))),
        };
        tracing::info!(backend = store.name(), "Scoreboard store ready");
        Ok(store)
    }
}

impl BoardPersistence for BoardStore {
    type Error = StoreError;

    fn name(&self) -> &'static str {
        match self {
            Self::Memory(s) => s.name(),
            Self::JsonFile(s) => s.name(),
            Self::Sheets(s) => s.name(),
            Self::CachedSheets(s) => s.name(),
        }
    }

    async fn load(&self) -> Result<Option<Scoreboard>, StoreError> {
        match self {
            Self::Memory(s) => s.load().await.map_err(|never| match never {}),
            Self::JsonFile(s) => s.load().await,
            Self::Sheets(s) => s.load().await,
            Self::CachedSheets(s) => s.load().await,
        }
    }

    async fn save(&self, board: &Scoreboard) -> Result<(), StoreError> {
        match self {
            Self::Memory(s) => s.save(board).await.map_err(|never| match never {}),
            Self::JsonFile(s) => s.save(board).await,
            Self::Sheets(s) => s.save(board).await,
            Self::CachedSheets(s) => s.save(board).await,
        }
    }
}

/// The configured budget ledger backend.
#[derive(Debug)]
pub enum LedgerStore {
    /// In-process only.
    Memory(MemoryLedger),
    /// Local JSON document.
    JsonFile(JsonLedgerFile),
    /// Spreadsheet rows.
    Sheets(SheetsLedger),
}

impl LedgerStore {
    /// Build the backend selected by `budget.backend`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] or [`StoreError::Http`] when a
    /// spreadsheet client cannot be built.
    pub fn from_config(config: &TallyConfig) -> Result<Self, StoreError> {
        let store = match config.budget.backend {
            LedgerBackend::Memory => Self::Memory(MemoryLedger::new()),
            LedgerBackend::JsonFile => Self::JsonFile(JsonLedgerFile::new(&config.budget.json_path)),
            LedgerBackend::Sheets => Self::Sheets(SheetsLedger::new(
                SheetsClient::new(&config.sheets)?,
                &config.sheets.budget_range,
            )),
        };
        tracing::info!(backend = store.name(), "Budget ledger ready");
        Ok(store)
    }
}

impl LedgerPersistence for LedgerStore {
    type Error = StoreError;

    fn name(&self) -> &'static str {
        match self {
            Self::Memory(s) => s.name(),
            Self::JsonFile(s) => s.name(),
            Self::Sheets(s) => s.name(),
        }
    }

    async fn list(&self) -> Result<Vec<BudgetEntry>, StoreError> {
        match self {
            Self::Memory(s) => s.list().await.map_err(|never| match never {}),
            Self::JsonFile(s) => s.list().await,
            Self::Sheets(s) => s.list().await,
        }
    }

    async fn append(&self, entry: &BudgetEntry) -> Result<(), StoreError> {
        match self {
            Self::Memory(s) => s.append(entry).await.map_err(|never| match never {}),
            Self::JsonFile(s) => s.append(entry).await,
            Self::Sheets(s) => s.append(entry).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_backends_from_config() {
        let mut config = TallyConfig::default();
        config.storage.backend = BoardBackend::Memory;
        config.budget.backend = LedgerBackend::Memory;

        let board = BoardStore::from_config(&config);
        assert!(matches!(board, Ok(BoardStore::Memory(_))));
        let ledger = LedgerStore::from_config(&config);
        assert!(matches!(ledger, Ok(LedgerStore::Memory(_))));
    }

    #[test]
    fn sheets_backend_without_id_is_a_config_error() {
        let mut config = TallyConfig::default();
        config.storage.backend = BoardBackend::CachedSheets;
        config.sheets.spreadsheet_id = String::new();

        assert!(matches!(BoardStore::from_config(&config), Err(StoreError::Config(_))));
    }

    #[tokio::test]
    async fn json_file_store_dispatches() {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(e) => panic!("tempdir: {e}"),
        };
        let mut config = TallyConfig::default();
        config.storage.json_path = dir.path().join("scores.json");

        let store = BoardStore::from_config(&config);
        let Ok(store) = store else {
            panic!("store: {store:?}");
        };
        assert_eq!(store.name(), "json_file");

        let board = Scoreboard::new(["Ana"], ["calls"]);
        assert!(store.save(&board).await.is_ok());
        assert!(matches!(store.load().await, Ok(Some(b)) if b == board));
    }
}
