//! Budget ledger entries and their summary.
//!
//! Amounts use [`Decimal`] so totals never pick up floating-point drift.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::EntryId;

/// Whether an entry adds to or subtracts from the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// Money received.
    Income,
    /// Money spent.
    Expense,
}

impl EntryKind {
    /// Label used in forms and spreadsheet cells.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }
}

impl core::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is neither `Income` nor `Expense`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entry type: {0}")]
pub struct ParseEntryKindError(pub String);

impl core::str::FromStr for EntryKind {
    type Err = ParseEntryKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(ParseEntryKindError(s.to_owned())),
        }
    }
}

/// One validated budget ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetEntry {
    /// Unique entry identifier.
    pub id: EntryId,
    /// Date the money moved.
    pub date: NaiveDate,
    /// Income or expense.
    pub kind: EntryKind,
    /// Free-text description.
    pub description: String,
    /// Strictly positive amount.
    pub amount: Decimal,
}

/// Totals over a set of budget entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSummary {
    /// Sum of all income amounts.
    pub total_income: Decimal,
    /// Sum of all expense amounts.
    pub total_expense: Decimal,
    /// `total_income - total_expense`.
    pub balance: Decimal,
    /// Number of entries summarised.
    pub entry_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_kind_parses_case_insensitively() {
        assert_eq!("income".parse::<EntryKind>(), Ok(EntryKind::Income));
        assert_eq!(" Expense ".parse::<EntryKind>(), Ok(EntryKind::Expense));
        assert!("refund".parse::<EntryKind>().is_err());
    }

    #[test]
    fn entry_kind_displays_label() {
        assert_eq!(EntryKind::Income.to_string(), "Income");
    }
}
