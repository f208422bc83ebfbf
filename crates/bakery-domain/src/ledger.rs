//! Reporting windows and the derived income/expense transaction view.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{common::*, order::OrderStatus};

/// Category reported for order income.
pub const SALES_CATEGORY: &str = "Sales";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Half-open `[start, end)` range of calendar days used for rollups.
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateWindowError> {
        if end <= start {
            return Err(DateWindowError::InvalidRange);
        }
        Ok(Self { start, end })
    }

    /// Window covering `start..=end`, both days included in full.
    pub fn inclusive(start: NaiveDate, end: NaiveDate) -> Result<Self, DateWindowError> {
        Self::new(start, end + Duration::days(1))
    }

    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date + Duration::days(1),
        }
    }

    pub fn month_of(date: NaiveDate) -> Self {
        let start = first_of_month(date);
        Self {
            start,
            end: shift_month(start, 1),
        }
    }

    pub fn previous_month_of(date: NaiveDate) -> Self {
        Self::month_of(shift_month(first_of_month(date), -1))
    }

    pub fn quarter_of(date: NaiveDate) -> Self {
        let start = first_of_quarter(date);
        Self {
            start,
            end: shift_month(start, 3),
        }
    }

    pub fn year_of(date: NaiveDate) -> Self {
        let start = first_of_year(date);
        Self {
            start,
            end: shift_month(start, 12),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    /// Like [`DateWindow::contains`]; undated records fall outside every window.
    pub fn contains_instant(&self, instant: Option<DateTime<Utc>>) -> bool {
        instant.is_some_and(|instant| self.contains(instant.date_naive()))
    }

    /// Calendar days covered by the window.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day < end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Errors that can occur when constructing [`DateWindow`] values.
pub enum DateWindowError {
    InvalidRange,
}

impl fmt::Display for DateWindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateWindowError::InvalidRange => f.write_str("date window end must be after start"),
        }
    }
}

impl std::error::Error for DateWindowError {}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        };
        f.write_str(label)
    }
}

/// Fields that only exist on one side of the ledger.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum TransactionSource {
    #[serde(rename_all = "camelCase")]
    Order {
        order_number: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        customer: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Expense {
        payment_method: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
}

/// One row of the unified ledger. Derived on every request, never stored.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: String,
    pub description: String,
    pub amount: f64,
    pub status: OrderStatus,
    pub date: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub source: TransactionSource,
}

impl Transaction {
    /// Income from a delivered or completed order.
    pub fn is_booked_income(&self) -> bool {
        self.kind == TransactionKind::Income && self.status.counts_as_revenue()
    }

    pub fn order_number(&self) -> Option<&str> {
        match &self.source {
            TransactionSource::Order { order_number, .. } => Some(order_number),
            TransactionSource::Expense { .. } => None,
        }
    }

    pub fn customer(&self) -> Option<&str> {
        match &self.source {
            TransactionSource::Order { customer, .. } => customer.as_deref(),
            TransactionSource::Expense { .. } => None,
        }
    }

    pub fn payment_method(&self) -> Option<&str> {
        match &self.source {
            TransactionSource::Order { .. } => None,
            TransactionSource::Expense { payment_method, .. } => Some(payment_method),
        }
    }
}

impl Amounted for Transaction {
    fn amount(&self) -> f64 {
        self.amount
    }
}

impl Dated for Transaction {
    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn windows_are_half_open() {
        let window = DateWindow::month_of(date(2026, 10, 19));
        assert_eq!(window.start, date(2026, 10, 1));
        assert_eq!(window.end, date(2026, 11, 1));
        assert!(window.contains(date(2026, 10, 31)));
        assert!(!window.contains(date(2026, 11, 1)));
        assert_eq!(window.days().count(), 31);
    }

    #[test]
    fn previous_month_crosses_year_boundary() {
        let window = DateWindow::previous_month_of(date(2026, 1, 10));
        assert_eq!(window.start, date(2025, 12, 1));
        assert_eq!(window.end, date(2026, 1, 1));
    }

    #[test]
    fn inclusive_window_keeps_the_end_day() {
        let window = DateWindow::inclusive(date(2026, 10, 1), date(2026, 10, 1)).unwrap();
        assert!(window.contains(date(2026, 10, 1)));
        assert!(!window.contains(date(2026, 10, 2)));
        assert_eq!(
            DateWindow::inclusive(date(2026, 10, 2), date(2026, 10, 1)),
            Err(DateWindowError::InvalidRange)
        );
    }

    #[test]
    fn quarter_and_year_windows() {
        let quarter = DateWindow::quarter_of(date(2026, 11, 5));
        assert_eq!((quarter.start, quarter.end), (date(2026, 10, 1), date(2027, 1, 1)));
        let year = DateWindow::year_of(date(2026, 11, 5));
        assert_eq!((year.start, year.end), (date(2026, 1, 1), date(2027, 1, 1)));
    }

    #[test]
    fn undated_instants_fall_outside() {
        assert!(!DateWindow::day(date(2026, 10, 19)).contains_instant(None));
    }

    #[test]
    fn transaction_serializes_flat_source_fields() {
        let txn = Transaction {
            id: "ASI1".into(),
            kind: TransactionKind::Income,
            category: SALES_CATEGORY.into(),
            description: "Order #ASI1".into(),
            amount: 2000.0,
            status: OrderStatus::Completed,
            date: None,
            source: TransactionSource::Order {
                order_number: "ASI1".into(),
                customer: Some("Nimali".into()),
            },
        };
        let json = serde_json::to_value(&txn).unwrap();
        assert_eq!(json["type"], "income");
        assert_eq!(json["orderNumber"], "ASI1");
        assert_eq!(json["customer"], "Nimali");
        assert!(txn.is_booked_income());
    }
}
