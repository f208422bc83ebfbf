//! The monthly spending plan and its utilization tiers.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lenient;

/// Fixed identifier of the single budget document.
pub const BUDGET_SINGLETON_ID: &str = "budget";

/// Utilization at or above which a budget is flagged as `Warning`.
pub const WARNING_THRESHOLD_PERCENT: f64 = 80.0;
/// Utilization above which a budget is flagged as `OverBudget`.
pub const OVER_BUDGET_THRESHOLD_PERCENT: f64 = 100.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(default = "Budget::singleton_id")]
    pub id: String,
    #[serde(
        default,
        deserialize_with = "lenient::amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub monthly_budget: Option<f64>,
    #[serde(default, deserialize_with = "lenient::amount_map")]
    pub categories: BTreeMap<String, f64>,
    #[serde(
        default,
        deserialize_with = "lenient::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Budget {
    pub fn new(monthly_budget: f64) -> Self {
        Self {
            id: Self::singleton_id(),
            monthly_budget: Some(monthly_budget),
            categories: BTreeMap::new(),
            updated_at: None,
        }
    }

    pub fn singleton_id() -> String {
        BUDGET_SINGLETON_ID.to_string()
    }

    pub fn with_category(mut self, name: impl Into<String>, amount: f64) -> Self {
        self.categories.insert(name.into(), amount);
        self
    }

    /// Monthly ceiling, when one is configured with a positive value.
    pub fn monthly_limit(&self) -> Option<f64> {
        self.monthly_budget
            .filter(|amount| amount.is_finite() && *amount > 0.0)
    }

    /// Categories that carry a positive budgeted amount, in name order.
    pub fn configured_categories(&self) -> impl Iterator<Item = (&str, f64)> {
        self.categories
            .iter()
            .filter(|(_, amount)| amount.is_finite() && **amount > 0.0)
            .map(|(name, amount)| (name.as_str(), *amount))
    }
}

/// Status tier for a utilization percentage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BudgetTier {
    Safe,
    Warning,
    OverBudget,
}

impl BudgetTier {
    /// `< 80` safe, `80..=100` warning, `> 100` over budget.
    pub fn from_utilization(percent: f64) -> Self {
        if percent > OVER_BUDGET_THRESHOLD_PERCENT {
            BudgetTier::OverBudget
        } else if percent >= WARNING_THRESHOLD_PERCENT {
            BudgetTier::Warning
        } else {
            BudgetTier::Safe
        }
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BudgetTier::Safe => "Safe",
            BudgetTier::Warning => "Warning",
            BudgetTier::OverBudget => "Over Budget",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries_are_inclusive_as_documented() {
        assert_eq!(BudgetTier::from_utilization(79.99), BudgetTier::Safe);
        assert_eq!(BudgetTier::from_utilization(80.0), BudgetTier::Warning);
        assert_eq!(BudgetTier::from_utilization(100.0), BudgetTier::Warning);
        assert_eq!(BudgetTier::from_utilization(100.01), BudgetTier::OverBudget);
    }

    #[test]
    fn zero_and_blank_amounts_are_not_configured() {
        let budget: Budget = serde_json::from_str(
            r#"{"monthlyBudget": "0", "categories": {"Rent": "", "Utilities": "0", "Ingredients": "4000"}}"#,
        )
        .unwrap();
        assert_eq!(budget.id, BUDGET_SINGLETON_ID);
        assert_eq!(budget.monthly_limit(), None);
        let configured: Vec<_> = budget.configured_categories().collect();
        assert_eq!(configured, vec![("Ingredients", 4000.0)]);
    }
}
