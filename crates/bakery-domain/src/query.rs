//! Filters the transactions view accepts, mirroring the dashboard controls.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
    common::{add_up, first_of_year, shift_month, Amounted},
    ledger::{Transaction, TransactionKind},
};

/// Date range presets, evaluated against the request day.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RangePreset {
    #[default]
    All,
    Today,
    /// The last seven days.
    Week,
    /// The last calendar month counted back from today.
    Month,
    /// The last three months counted back from today.
    Quarter,
    /// Since January 1st.
    Year,
    /// Inclusive on both ends.
    Custom { start: NaiveDate, end: NaiveDate },
}

impl RangePreset {
    pub fn matches(&self, date: Option<NaiveDate>, today: NaiveDate) -> bool {
        let Some(date) = date else {
            return matches!(self, RangePreset::All);
        };
        match self {
            RangePreset::All => true,
            RangePreset::Today => date >= today,
            RangePreset::Week => date >= today - Duration::days(7),
            RangePreset::Month => date >= shift_month(today, -1),
            RangePreset::Quarter => date >= shift_month(today, -3),
            RangePreset::Year => date >= first_of_year(today),
            RangePreset::Custom { start, end } => date >= *start && date <= *end,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    DateDesc,
    DateAsc,
    AmountDesc,
    AmountAsc,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    /// `None` keeps both income and expenses.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub range: RangePreset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

impl TransactionQuery {
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn range(mut self, range: RangePreset) -> Self {
        self.range = range;
        self
    }

    pub fn search(mut self, needle: impl Into<String>) -> Self {
        self.search = Some(needle.into());
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Totals over a filtered slice of the ledger.
pub struct FilteredStats {
    pub income: f64,
    pub expenses: f64,
    pub profit: f64,
    pub count: usize,
}

impl FilteredStats {
    /// Income only counts delivered or completed orders.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let income = add_up(
            transactions
                .iter()
                .filter(|txn| txn.is_booked_income())
                .map(Amounted::amount),
        );
        let expenses = add_up(
            transactions
                .iter()
                .filter(|txn| txn.kind == TransactionKind::Expense)
                .map(Amounted::amount),
        );
        Self {
            income,
            expenses,
            profit: income - expenses,
            count: transactions.len(),
        }
    }
}
