//! Local JSON document backends.
//!
//! The scoreboard is stored as one pretty-printed document:
//!
//! ```json
//! {
//!   "participants": ["Ana", "Ben"],
//!   "categories": [{ "name": "prospecting", "totals": { "Ana": 3, "Ben": 0 } }]
//! }
//! ```
//!
//! The ledger is stored as `{"entries": [...]}`. A missing file reads as
//! "nothing stored yet". Writes go to a sibling temp file which is then
//! renamed over the target, so a crash mid-write leaves the old document.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tally_core::{BoardPersistence, LedgerPersistence};
use tally_types::{BudgetEntry, Scoreboard};
use tokio::fs;
use tokio::sync::Mutex;

use crate::error::StoreError;

/// Scoreboard stored in a local JSON file.
///
/// Saves share one temp file, so they are serialised by an internal lock.
/// Concurrent sessions still overwrite each other; the last save wins.
#[derive(Debug)]
pub struct JsonBoardFile {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonBoardFile {
    /// Store the board at `path`. Parent directories are created on save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }
}

impl BoardPersistence for JsonBoardFile {
    type Error = StoreError;

    fn name(&self) -> &'static str {
        "json_file"
    }

    async fn load(&self) -> Result<Option<Scoreboard>, StoreError> {
        let Some(json) = read_optional(&self.path).await? else {
            tracing::debug!(path = %self.path.display(), "No scoreboard file yet");
            return Ok(None);
        };
        let board: Scoreboard = serde_json::from_str(&json)?;
        tracing::debug!(
            path = %self.path.display(),
            participants = board.participants().len(),
            "Scoreboard loaded"
        );
        Ok(Some(board))
    }

    async fn save(&self, board: &Scoreboard) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(board)?;
        let _guard = self.write_lock.lock().await;
        write_atomic(&self.path, json.as_bytes()).await
    }
}

/// On-disk shape of the ledger file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerDocument {
    #[serde(default)]
    entries: Vec<BudgetEntry>,
}

/// Budget ledger stored in a local JSON file.
///
/// Appends are read-modify-write, serialised by an internal lock.
#[derive(Debug)]
pub struct JsonLedgerFile {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLedgerFile {
    /// Store the ledger at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_document(&self) -> Result<LedgerDocument, StoreError> {
        match read_optional(&self.path).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(LedgerDocument::default()),
        }
    }
}

impl LedgerPersistence for JsonLedgerFile {
    type Error = StoreError;

    fn name(&self) -> &'static str {
        "json_file"
    }

    async fn list(&self) -> Result<Vec<BudgetEntry>, StoreError> {
        Ok(self.read_document().await?.entries)
    }

    async fn append(&self, entry: &BudgetEntry) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        document.entries.push(entry.clone());
        let json = serde_json::to_string_pretty(&document)?;
        write_atomic(&self.path, json.as_bytes()).await
    }
}

/// Read a file, mapping "not found" to `None`.
async fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(path).await {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write `bytes` to a temp file next to `path`, then rename it into place.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, bytes).await?;
    fs::rename(&tmp_path, path).await?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "File written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use tally_types::{EntryId, EntryKind};
    use tempfile::TempDir;

    use super::*;

    fn temp_dir() -> TempDir {
        match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(e) => panic!("tempdir: {e}"),
        }
    }

    #[tokio::test]
    async fn missing_file_loads_as_none() {
        let dir = temp_dir();
        let store = JsonBoardFile::new(dir.path().join("scores.json"));
        assert!(matches!(store.load().await, Ok(None)));
    }

    #[tokio::test]
    async fn board_round_trips_through_nested_directory() {
        let dir = temp_dir();
        let store = JsonBoardFile::new(dir.path().join("data").join("scores.json"));

        let mut board = Scoreboard::new(["Ana", "Ben"], ["prospecting", "recruitment"]);
        assert!(board.add_points("prospecting", "Ana", 12).is_ok());
        assert!(board.add_points("recruitment", "Ben", -3).is_ok());

        assert!(store.save(&board).await.is_ok());
        assert!(!dir.path().join("data").join("scores.json.tmp").exists());

        let loaded = store.load().await;
        assert!(matches!(loaded, Ok(Some(ref b)) if *b == board));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_saves_leave_one_complete_document() {
        let dir = temp_dir();
        let store = Arc::new(JsonBoardFile::new(dir.path().join("scores.json")));

        for round in 0..10 {
            let mut tasks = Vec::new();
            for size in 1..=8_usize {
                let store = Arc::clone(&store);
                let names: Vec<String> = (0..size.saturating_mul(20))
                    .map(|i| format!("participant-{round}-{i}"))
                    .collect();
                let board = Scoreboard::new(&names, ["prospecting", "recruitment"]);
                tasks.push(tokio::spawn(async move { store.save(&board).await }));
            }
            for task in tasks {
                let saved = task.await;
                assert!(matches!(saved, Ok(Ok(()))), "save failed: {saved:?}");
            }

            let loaded = store.load().await;
            let Ok(Some(board)) = loaded else {
                panic!("round {round}: load failed: {loaded:?}");
            };
            assert!(board.participants().len() >= 20);
            assert!(board.participants().iter().all(|p| p.starts_with(&format!("participant-{round}-"))));
        }
    }

    #[tokio::test]
    async fn hand_edited_document_is_normalised() {
        let dir = temp_dir();
        let path = dir.path().join("scores.json");
        let json = r#"{
            "participants": ["Ana"],
            "categories": [{ "name": "prospecting", "totals": { "Ana": 4, "Ben": 2 } }]
        }"#;
        assert!(std::fs::write(&path, json).is_ok());

        let loaded = JsonBoardFile::new(&path).load().await;
        let Ok(Some(board)) = loaded else {
            panic!("load failed: {loaded:?}");
        };
        assert_eq!(board.participants(), ["Ana", "Ben"]);
        assert_eq!(board.score("prospecting", "Ben"), Some(2));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = temp_dir();
        let path = dir.path().join("scores.json");
        assert!(std::fs::write(&path, "{not json").is_ok());

        let loaded = JsonBoardFile::new(&path).load().await;
        assert!(matches!(loaded, Err(StoreError::Serialization(_))));
    }

    #[tokio::test]
    async fn ledger_appends_accumulate() {
        let dir = temp_dir();
        let ledger = JsonLedgerFile::new(dir.path().join("budget.json"));
        assert!(matches!(ledger.list().await, Ok(ref v) if v.is_empty()));

        for (description, kind) in [("Dues", EntryKind::Income), ("Venue", EntryKind::Expense)] {
            let entry = BudgetEntry {
                id: EntryId::new(),
                date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default(),
                kind,
                description: description.to_owned(),
                amount: Decimal::new(12_550, 2),
            };
            assert!(ledger.append(&entry).await.is_ok());
        }

        let reopened = JsonLedgerFile::new(dir.path().join("budget.json"));
        let entries = reopened.list().await.unwrap_or_default();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.first().map(|e| e.description.as_str()), Some("Dues"));
        assert_eq!(entries.last().map(|e| e.amount), Some(Decimal::new(12_550, 2)));
    }
}
