//! Remote spreadsheet backends over the Sheets v4 values API.
//!
//! # Endpoints
//!
//! | Method | Path | Use |
//! |--------|------|-----|
//! | `GET` | `/v4/spreadsheets/{id}/values/{range}` | Read rows |
//! | `PUT` | `/v4/spreadsheets/{id}/values/{range}?valueInputOption=RAW` | Overwrite rows |
//! | `POST` | `/v4/spreadsheets/{id}/values/{range}:append?valueInputOption=USER_ENTERED` | Append rows |
//!
//! # Scoreboard layout
//!
//! ```text
//! Participant | prospecting | recruitment
//! Ana         | 12          | 3
//! Ben         |             | x
//! ```
//!
//! Missing and non-numeric cells read as `0`; thousands separators are
//! ignored. Rows with an empty name are skipped, and a repeated name keeps
//! its first row. A save is a single overwrite padded with blank cells out
//! to the extent of what was stored before, so rows of removed
//! participants are blanked and a rejected write leaves the old board.
//!
//! # Ledger layout
//!
//! ```text
//! Date       | Type    | Description | Amount
//! 2024-06-01 | Income  | Dues        | 1500.50
//! ```
//!
//! Rows that do not parse are skipped with a warning. Entry identifiers are
//! not stored in the sheet, so each read assigns fresh ones.

use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use tally_core::config::SheetsConfig;
use tally_core::{BoardPersistence, LedgerPersistence};
use tally_types::{BudgetEntry, EntryId, EntryKind, Scoreboard};
use tokio::sync::Mutex;

use crate::error::StoreError;

/// Header cell above the participant-name column.
pub const PARTICIPANT_HEADER: &str = "Participant";

/// Header row of the budget ledger sheet.
pub const LEDGER_HEADER: [&str; 4] = ["Date", "Type", "Description", "Amount"];

const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Values API client
// ---------------------------------------------------------------------------

/// Response body of a values `GET`.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Thin client for one spreadsheet's values API.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: reqwest::Client,
    api_base: String,
    spreadsheet_id: String,
    access_token: String,
}

impl SheetsClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if no spreadsheet id is configured,
    /// or [`StoreError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SheetsConfig) -> Result<Self, StoreError> {
        if config.spreadsheet_id.trim().is_empty() {
            return Err(StoreError::Config(
                "sheets.spreadsheet_id must be set".to_owned(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            access_token: config.access_token.clone(),
        })
    }

    fn values_url(&self, range: &str, action: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{range}{action}",
            self.api_base, self.spreadsheet_id
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.access_token.is_empty() {
            request
        } else {
            request.bearer_auth(&self.access_token)
        }
    }

    /// Read every row in `range` as display strings.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] or [`StoreError::Sheets`].
    pub async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let request = self.client.get(self.values_url(range, ""));
        let response = check(self.authorize(request).send().await?).await?;
        let body: ValueRange = response.json().await?;

        tracing::debug!(range, rows = body.values.len(), "Sheet values read");
        Ok(body
            .values
            .into_iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }

    /// Overwrite `range`, starting at its top-left cell, with `rows`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] or [`StoreError::Sheets`].
    pub async fn update_values(&self, range: &str, rows: Vec<Vec<Value>>) -> Result<(), StoreError> {
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": rows,
        });
        let request = self
            .client
            .put(self.values_url(range, ""))
            .query(&[("valueInputOption", "RAW")])
            .json(&body);
        check(self.authorize(request).send().await?).await?;
        tracing::debug!(range, "Sheet values updated");
        Ok(())
    }

    /// Append `rows` after the last non-empty row of `range`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] or [`StoreError::Sheets`].
    pub async fn append_values(&self, range: &str, rows: Vec<Vec<Value>>) -> Result<(), StoreError> {
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": rows,
        });
        let request = self
            .client
            .post(self.values_url(range, ":append"))
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&body);
        check(self.authorize(request).send().await?).await?;
        tracing::debug!(range, "Sheet rows appended");
        Ok(())
    }
}

/// Turn a non-2xx response into [`StoreError::Sheets`].
async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read error body".to_owned());
    Err(StoreError::Sheets {
        status: status.as_u16(),
        body,
    })
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Scoreboard rows
// ---------------------------------------------------------------------------

/// Encode a board as a header row plus one row per participant.
pub fn board_to_rows(board: &Scoreboard) -> Vec<Vec<Value>> {
    let header = std::iter::once(Value::from(PARTICIPANT_HEADER))
        .chain(board.categories().iter().map(|c| Value::from(c.name())))
        .collect();

    let rows = board.participants().iter().map(|participant| {
        std::iter::once(Value::from(participant.as_str()))
            .chain(
                board
                    .categories()
                    .iter()
                    .map(|c| Value::from(c.total(participant).unwrap_or(0))),
            )
            .collect()
    });

    std::iter::once(header).chain(rows).collect()
}

/// Decode sheet rows into a board, or `None` for an empty range.
pub fn board_from_rows(rows: &[Vec<String>]) -> Option<Scoreboard> {
    let (header, body) = rows.split_first()?;
    let categories: Vec<&str> = header
        .iter()
        .skip(1)
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect();

    let mut board = Scoreboard::new(std::iter::empty::<&str>(), &categories);
    for row in body {
        let Some((name, cells)) = row.split_first() else {
            continue;
        };
        let name = name.trim();
        if board.add_participant(name).is_err() {
            continue;
        }
        for (category, cell) in header.iter().skip(1).zip(cells) {
            let _ = board.set_total(category.trim(), name, parse_points(cell));
        }
    }
    Some(board)
}

/// Parse a score cell; anything that is not an integer counts as zero.
fn parse_points(cell: &str) -> i64 {
    cell.trim().replace(',', "").parse().unwrap_or(0)
}

/// Pad `rows` with empty cells so they cover every cell of `previous`.
pub fn pad_to_extent(mut rows: Vec<Vec<Value>>, previous: &[Vec<String>]) -> Vec<Vec<Value>> {
    let width = previous
        .iter()
        .map(Vec::len)
        .chain(rows.iter().map(Vec::len))
        .max()
        .unwrap_or(0);
    let height = previous.len().max(rows.len());

    rows.resize_with(height, Vec::new);
    for row in &mut rows {
        row.resize(width, Value::from(""));
    }
    rows
}

/// Scoreboard stored in a spreadsheet range.
#[derive(Debug, Clone)]
pub struct SheetsBoard {
    client: SheetsClient,
    range: String,
}

impl SheetsBoard {
    /// Bind a client to the scoreboard range.
    pub fn new(client: SheetsClient, range: impl Into<String>) -> Self {
        Self {
            client,
            range: range.into(),
        }
    }
}

impl BoardPersistence for SheetsBoard {
    type Error = StoreError;

    fn name(&self) -> &'static str {
        "sheets"
    }

    async fn load(&self) -> Result<Option<Scoreboard>, StoreError> {
        let rows = self.client.get_values(&self.range).await?;
        Ok(board_from_rows(&rows))
    }

    async fn save(&self, board: &Scoreboard) -> Result<(), StoreError> {
        let previous = self.client.get_values(&self.range).await?;
        let rows = pad_to_extent(board_to_rows(board), &previous);
        self.client.update_values(&self.range, rows).await
    }
}

// ---------------------------------------------------------------------------
// Ledger rows
// ---------------------------------------------------------------------------

/// Encode one ledger entry as a sheet row.
pub fn entry_to_row(entry: &BudgetEntry) -> Vec<Value> {
    vec![
        Value::from(entry.date.format(DATE_FORMAT).to_string()),
        Value::from(entry.kind.as_str()),
        Value::from(entry.description.as_str()),
        Value::from(entry.amount.to_string()),
    ]
}

/// Decode ledger rows, skipping the header and any malformed row.
pub fn entries_from_rows(rows: &[Vec<String>]) -> Vec<BudgetEntry> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| !is_ledger_header(row))
        .filter_map(|(index, row)| {
            let entry = entry_from_row(row);
            if entry.is_none() {
                tracing::warn!(row = index.saturating_add(1), "Skipping malformed ledger row");
            }
            entry
        })
        .collect()
}

fn is_ledger_header(row: &[String]) -> bool {
    row.first().is_some_and(|c| c.trim() == LEDGER_HEADER[0])
}

fn entry_from_row(row: &[String]) -> Option<BudgetEntry> {
    let mut cells = row.iter().map(|c| c.trim());
    let date = NaiveDate::parse_from_str(cells.next()?, DATE_FORMAT).ok()?;
    let kind = EntryKind::from_str(cells.next()?).ok()?;
    let description = cells.next()?.to_owned();
    let amount = Decimal::from_str(&cells.next()?.replace(',', "")).ok()?;
    Some(BudgetEntry {
        id: EntryId::new(),
        date,
        kind,
        description,
        amount,
    })
}

/// Budget ledger appended to a spreadsheet range.
#[derive(Debug)]
pub struct SheetsLedger {
    client: SheetsClient,
    range: String,
    append_lock: Mutex<()>,
}

impl SheetsLedger {
    /// Bind a client to the ledger range.
    pub fn new(client: SheetsClient, range: impl Into<String>) -> Self {
        Self {
            client,
            range: range.into(),
            append_lock: Mutex::new(()),
        }
    }
}

impl LedgerPersistence for SheetsLedger {
    type Error = StoreError;

    fn name(&self) -> &'static str {
        "sheets"
    }

    async fn list(&self) -> Result<Vec<BudgetEntry>, StoreError> {
        let rows = self.client.get_values(&self.range).await?;
        Ok(entries_from_rows(&rows))
    }

    async fn append(&self, entry: &BudgetEntry) -> Result<(), StoreError> {
        let _guard = self.append_lock.lock().await;
        let existing = self.client.get_values(&self.range).await?;

        let mut rows = Vec::with_capacity(2);
        if existing.is_empty() {
            rows.push(LEDGER_HEADER.iter().map(|h| Value::from(*h)).collect());
        }
        rows.push(entry_to_row(entry));
        self.client.append_values(&self.range, rows).await
    }
}
