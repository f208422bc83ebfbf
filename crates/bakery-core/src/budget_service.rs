//! Compares current-month spending with the configured budget.

use std::collections::BTreeMap;

use bakery_domain::{finite_or_zero, Budget, BudgetReport, BudgetTier, CategoryUtilization};
use tracing::info;

use crate::{storage::RecordStore, time::Clock, CoreError, CoreResult};

/// Adherence reported when no monthly budget is configured.
pub const NEUTRAL_ADHERENCE: f64 = 50.0;

/// Stateless budgeting utilities over the singleton [`Budget`] document.
pub struct BudgetService;

impl BudgetService {
    pub fn load(store: &dyn RecordStore) -> CoreResult<Option<Budget>> {
        store.find_budget()
    }

    /// Validates and upserts the budget singleton.
    pub fn save(store: &dyn RecordStore, clock: &dyn Clock, budget: Budget) -> CoreResult<Budget> {
        let monthly = budget
            .monthly_budget
            .ok_or_else(|| CoreError::invalid("monthly budget is required"))?;
        if !monthly.is_finite() || monthly < 0.0 {
            return Err(CoreError::invalid(
                "monthly budget must be a non-negative number",
            ));
        }
        if let Some((name, _)) = budget
            .categories
            .iter()
            .find(|(_, amount)| !amount.is_finite() || **amount < 0.0)
        {
            return Err(CoreError::invalid(format!(
                "budget for category {name} must be a non-negative number"
            )));
        }

        let saved = Budget {
            id: Budget::singleton_id(),
            updated_at: Some(clock.now()),
            ..budget
        };
        store.upsert_budget(&saved)?;
        info!(
            "saved budget: monthly {:.2}, {} categories",
            monthly,
            saved.categories.len()
        );
        Ok(saved)
    }

    /// `spent / budgeted × 100`, or `None` when nothing is budgeted.
    pub fn utilization(spent: f64, budgeted: Option<f64>) -> Option<f64> {
        budgeted
            .filter(|amount| amount.is_finite() && *amount > 0.0)
            .map(|amount| finite_or_zero(spent / amount * 100.0))
    }

    /// `max(0, 200 − utilization)`, neutral when no monthly budget is set.
    pub fn adherence(utilization: Option<f64>) -> f64 {
        match utilization {
            Some(percent) => (200.0 - percent).max(0.0),
            None => NEUTRAL_ADHERENCE,
        }
    }

    /// Builds the tracker report from this month's spending.
    pub fn track(
        budget: Option<&Budget>,
        monthly_expenses: f64,
        expense_categories: &BTreeMap<String, f64>,
    ) -> BudgetReport {
        let monthly_budget = budget.and_then(Budget::monthly_limit);
        let utilization = Self::utilization(monthly_expenses, monthly_budget);
        let categories: Vec<CategoryUtilization> = budget
            .map(|budget| {
                budget
                    .configured_categories()
                    .map(|(name, budgeted)| {
                        let spent = expense_categories.get(name).copied().unwrap_or(0.0);
                        let percent = Self::utilization(spent, Some(budgeted)).unwrap_or(0.0);
                        CategoryUtilization {
                            category: name.to_string(),
                            budgeted,
                            spent,
                            remaining: budgeted - spent,
                            utilization: percent,
                            tier: BudgetTier::from_utilization(percent),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        BudgetReport {
            configured: monthly_budget.is_some(),
            monthly_budget,
            spent: monthly_expenses,
            remaining: monthly_budget.map(|limit| limit - monthly_expenses),
            utilization,
            tier: utilization.map(BudgetTier::from_utilization),
            over_budget: monthly_budget.is_some_and(|limit| monthly_expenses > limit),
            adherence: Self::adherence(utilization),
            categories,
        }
    }
}
