//! Manually entered operating expenses.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::{common::*, lenient};

pub const DEFAULT_EXPENSE_CATEGORY: &str = "General";
pub const DEFAULT_PAYMENT_METHOD: &str = "cash";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Uuid,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "lenient::amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub payment_method: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub note: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Expense {
    pub fn new(description: impl Into<String>, amount: f64, category: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            amount: Some(amount),
            category: Some(category.into()),
            date: None,
            payment_method: None,
            note: None,
            created_at: None,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        self
    }

    /// Category label, `General` when none was recorded.
    pub fn category(&self) -> &str {
        self.category
            .as_deref()
            .unwrap_or(DEFAULT_EXPENSE_CATEGORY)
    }

    pub fn payment_method(&self) -> &str {
        self.payment_method
            .as_deref()
            .unwrap_or(DEFAULT_PAYMENT_METHOD)
    }
}

impl Amounted for Expense {
    fn amount(&self) -> f64 {
        self.amount.map(finite_or_zero).unwrap_or(0.0)
    }
}

impl Dated for Expense {
    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.date.or(self.created_at)
    }
}

impl Displayable for Expense {
    fn display_label(&self) -> String {
        format!("expense:{} [{}]", self.id, self.category())
    }
}

/// Ids written before expenses carried UUIDs map to a stable name-based UUID,
/// so the record can still be listed and deleted.
fn lenient_id<'de, D>(deserializer: D) -> Result<Uuid, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match lenient::label(deserializer)? {
        Some(raw) => Uuid::parse_str(&raw)
            .unwrap_or_else(|_| Uuid::new_v5(&Uuid::NAMESPACE_OID, raw.as_bytes())),
        None => Uuid::nil(),
    })
}

/// Operator input for a new expense, as submitted by the back-office form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDraft {
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "lenient::amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub payment_method: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub note: Option<String>,
}

impl ExpenseDraft {
    pub fn new(description: impl Into<String>, amount: f64) -> Self {
        Self {
            description: description.into(),
            amount: Some(amount),
            ..Self::default()
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        self
    }
}
