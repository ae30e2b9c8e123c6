//! Budget ledger rules: entry validation, summaries, and amount formatting.
//!
//! The ledger is append-only. Entries are validated before they reach the
//! backend, and reports list the newest entries first.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_types::{BudgetEntry, BudgetSummary, EntryId, EntryKind};

use crate::error::BudgetError;
use crate::persist::LedgerPersistence;

/// An unvalidated budget entry as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewEntry {
    /// Date the money moved.
    pub date: NaiveDate,
    /// Income or expense.
    pub kind: EntryKind,
    /// Free-text description.
    pub description: String,
    /// Amount; must be strictly positive.
    pub amount: Decimal,
}

impl NewEntry {
    /// Validate and assign an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetError::EmptyDescription`] or
    /// [`BudgetError::NonPositiveAmount`].
    pub fn validate(self) -> Result<BudgetEntry, BudgetError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(BudgetError::EmptyDescription);
        }
        if self.amount <= Decimal::ZERO {
            return Err(BudgetError::NonPositiveAmount);
        }
        Ok(BudgetEntry {
            id: EntryId::new(),
            date: self.date,
            kind: self.kind,
            description: description.to_owned(),
            amount: self.amount,
        })
    }
}

/// Summary plus entries, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BudgetReport {
    /// Totals over all entries.
    pub summary: BudgetSummary,
    /// Entries sorted by date, newest first.
    pub entries: Vec<BudgetEntry>,
    /// Currency prefix for display.
    pub currency_symbol: String,
}

impl BudgetReport {
    /// Format an amount with this report's currency symbol.
    pub fn format(&self, amount: Decimal) -> String {
        format_amount(amount, &self.currency_symbol)
    }
}

/// Total income, total expense, and balance over `entries`.
pub fn summarize<'a>(entries: impl IntoIterator<Item = &'a BudgetEntry>) -> BudgetSummary {
    entries
        .into_iter()
        .fold(BudgetSummary::default(), |mut summary, entry| {
            match entry.kind {
                EntryKind::Income => {
                    summary.total_income = summary.total_income.saturating_add(entry.amount);
                }
                EntryKind::Expense => {
                    summary.total_expense = summary.total_expense.saturating_add(entry.amount);
                }
            }
            summary.balance = summary.total_income.saturating_sub(summary.total_expense);
            summary.entry_count = summary.entry_count.saturating_add(1);
            summary
        })
}

/// Format `amount` as `{symbol}1,234.50`.
///
/// Rounds to two decimal places and groups the integer part by thousands.
/// Negative amounts put the sign after the symbol (`₱-12.00`).
pub fn format_amount(amount: Decimal, symbol: &str) -> String {
    let rounded = amount.round_dp(2);
    let text = format!("{:.2}", rounded.abs());
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let reversed: Vec<char> = integer.chars().rev().collect();
    let groups: Vec<String> = reversed
        .chunks(3)
        .rev()
        .map(|chunk| chunk.iter().rev().collect())
        .collect();

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{symbol}{sign}{}.{fraction}", groups.join(","))
}

/// The budget ledger bound to a backend.
#[derive(Debug)]
pub struct BudgetBook<L> {
    ledger: L,
    currency_symbol: String,
}

impl<L: LedgerPersistence> BudgetBook<L> {
    /// Wrap a ledger backend.
    pub fn new(ledger: L, currency_symbol: impl Into<String>) -> Self {
        Self {
            ledger,
            currency_symbol: currency_symbol.into(),
        }
    }

    /// Validate and append an entry.
    ///
    /// Nothing is stored when validation fails.
    ///
    /// # Errors
    ///
    /// Returns a validation error or [`BudgetError::Persist`].
    pub async fn add(&self, entry: NewEntry) -> Result<BudgetEntry, BudgetError> {
        let entry = entry.validate()?;
        self.ledger.append(&entry).await.map_err(|e| {
            tracing::warn!(backend = self.ledger.name(), error = %e, "Failed to append budget entry");
            BudgetError::persist(self.ledger.name(), e)
        })?;
        tracing::info!(
            entry_id = %entry.id,
            kind = %entry.kind,
            amount = %entry.amount,
            "Budget entry added"
        );
        Ok(entry)
    }

    /// Summary and entries, newest first.
    ///
    /// Entries on the same date keep the most recently added first.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetError::Persist`] if the backend cannot be read.
    pub async fn report(&self) -> Result<BudgetReport, BudgetError> {
        let mut entries = self
            .ledger
            .list()
            .await
            .map_err(|e| BudgetError::persist(self.ledger.name(), e))?;
        entries.reverse();
        entries.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(BudgetReport {
            summary: summarize(&entries),
            entries,
            currency_symbol: self.currency_symbol.clone(),
        })
    }
}
