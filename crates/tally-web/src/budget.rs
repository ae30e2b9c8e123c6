//! Budget tracker page, entry form, and JSON summary.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/budget` | Summary metrics, entries, entry form |
//! | `POST` | `/budget/entries` | Add an income or expense entry |
//! | `GET` | `/api/budget` | JSON summary and entries |

use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::response::{Html, Redirect};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use tally_core::{BudgetReport, NewEntry};
use tally_types::EntryKind;

use crate::error::{PageError, WebError};
use crate::state::AppState;

/// Form body for `POST /budget/entries`.
///
/// Fields arrive as text and are parsed here so a bad value becomes a
/// readable 400 instead of an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct EntryForm {
    /// `Income` or `Expense` (case-insensitive).
    pub kind: String,
    /// Free-text description.
    pub description: String,
    /// Decimal amount, e.g. `1500.50`.
    pub amount: String,
    /// `YYYY-MM-DD`; empty means today.
    #[serde(default)]
    pub date: String,
}

impl EntryForm {
    fn parse(self, today: NaiveDate) -> Result<NewEntry, WebError> {
        let kind = EntryKind::from_str(&self.kind)
            .map_err(|e| WebError::BadRequest(e.to_string()))?;
        let amount = Decimal::from_str(self.amount.trim())
            .map_err(|e| WebError::BadRequest(format!("invalid amount: {e}")))?;
        let date = match self.date.trim() {
            "" => today,
            raw => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|e| WebError::BadRequest(format!("invalid date: {e}")))?,
        };
        Ok(NewEntry {
            date,
            kind,
            description: self.description,
            amount,
        })
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Render the budget page.
pub async fn show_budget(State(state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    let report = state.budget()?.report().await?;
    Ok(Html(state.pages.budget(&report, today())?))
}

/// Validate and store a new entry, then return to the budget page.
pub async fn add_entry(
    State(state): State<Arc<AppState>>,
    form: Result<Form<EntryForm>, FormRejection>,
) -> Result<Redirect, PageError> {
    let Form(form) = form.map_err(|e| WebError::BadRequest(e.body_text()))?;
    let book = state.budget()?;
    book.add(form.parse(today())?).await?;
    Ok(Redirect::to("/budget"))
}

/// Summary and entries as JSON.
pub async fn get_budget(State(state): State<Arc<AppState>>) -> Result<Json<BudgetReport>, WebError> {
    Ok(Json(state.budget()?.report().await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(kind: &str, amount: &str, date: &str) -> EntryForm {
        EntryForm {
            kind: kind.to_owned(),
            description: "Dues".to_owned(),
            amount: amount.to_owned(),
            date: date.to_owned(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap_or_default()
    }

    #[test]
    fn empty_date_means_today() {
        let entry = form("income", "10.50", "").parse(day(9));
        assert!(matches!(entry, Ok(ref e) if e.date == day(9) && e.kind == EntryKind::Income));
    }

    #[test]
    fn explicit_date_is_parsed() {
        let entry = form("Expense", "3", "2024-06-02").parse(day(9));
        assert!(matches!(entry, Ok(ref e) if e.date == day(2)));
    }

    #[test]
    fn bad_fields_are_bad_requests() {
        assert!(matches!(form("gift", "1", "").parse(day(1)), Err(WebError::BadRequest(_))));
        assert!(matches!(form("Income", "lots", "").parse(day(1)), Err(WebError::BadRequest(_))));
        assert!(matches!(form("Income", "1", "06/02/2024").parse(day(1)), Err(WebError::BadRequest(_))));
    }
}
