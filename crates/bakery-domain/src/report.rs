//! Report payloads produced by the aggregation, budget and health services.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    budget::{Budget, BudgetTier},
    ledger::DateWindow,
    order::OrderStatus,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Revenue, expenses and profit over one window.
pub struct PeriodTotals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<DateWindow>,
    pub revenue: f64,
    pub expenses: f64,
    pub profit: f64,
}

impl PeriodTotals {
    pub fn from_parts(window: Option<DateWindow>, revenue: f64, expenses: f64) -> Self {
        Self {
            window,
            revenue,
            expenses,
            profit: revenue - expenses,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRollup {
    pub label: String,
    pub year: i32,
    pub month: u32,
    /// Orders placed in the month, whatever their status.
    pub orders: usize,
    pub revenue: f64,
    pub expenses: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyRevenue {
    pub day: u32,
    pub date: NaiveDate,
    pub revenue: f64,
}

impl DailyRevenue {
    pub fn new(date: NaiveDate, revenue: f64) -> Self {
        Self {
            day: date.day(),
            date,
            revenue,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductRanking {
    pub name: String,
    pub quantity: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderCounts {
    pub total: usize,
    pub pending: usize,
    /// Delivered or completed.
    pub completed: usize,
    pub cancelled: usize,
    pub by_status: BTreeMap<OrderStatus, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUtilization {
    pub category: String,
    pub budgeted: f64,
    pub spent: f64,
    pub remaining: f64,
    pub utilization: f64,
    pub tier: BudgetTier,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Current-month spending compared against the configured budget.
pub struct BudgetReport {
    pub configured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_budget: Option<f64>,
    pub spent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utilization: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<BudgetTier>,
    pub over_budget: bool,
    /// Input to the health score: 50 when no monthly budget is configured.
    pub adherence: f64,
    pub categories: Vec<CategoryUtilization>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthInputs {
    pub profit_margin: f64,
    pub revenue_growth: f64,
    pub budget_adherence: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HealthGrade {
    A,
    B,
    C,
    D,
}

impl HealthGrade {
    /// Lower bounds are inclusive: 80 is an A, 79 a B.
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => HealthGrade::A,
            60..=79 => HealthGrade::B,
            40..=59 => HealthGrade::C,
            _ => HealthGrade::D,
        }
    }
}

impl fmt::Display for HealthGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthGrade::A => "A",
            HealthGrade::B => "B",
            HealthGrade::C => "C",
            HealthGrade::D => "D",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub score: u8,
    pub grade: HealthGrade,
    pub profit_score: f64,
    pub growth_score: f64,
    pub budget_score: f64,
    pub inputs: HealthInputs,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Everything the finance dashboard shows, re-derived from raw records.
pub struct FinancialSummary {
    pub generated_at: DateTime<Utc>,
    pub all_time: PeriodTotals,
    pub today: PeriodTotals,
    pub this_month: PeriodTotals,
    pub last_month: PeriodTotals,
    pub this_quarter: PeriodTotals,
    pub this_year: PeriodTotals,
    pub revenue_growth: f64,
    pub profit_margin: f64,
    pub avg_order_value: f64,
    pub orders: OrderCounts,
    pub monthly_breakdown: Vec<MonthlyRollup>,
    pub daily_revenue: Vec<DailyRevenue>,
    pub category_revenue: BTreeMap<String, f64>,
    /// Current month, which is what the budget tracker compares against.
    pub expense_categories: BTreeMap<String, f64>,
    pub all_time_expense_categories: BTreeMap<String, f64>,
    pub payment_methods: BTreeMap<String, f64>,
    pub top_products: Vec<ProductRanking>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<Budget>,
    pub budget_report: BudgetReport,
    pub health: HealthReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_bounds_are_inclusive() {
        assert_eq!(HealthGrade::from_score(80), HealthGrade::A);
        assert_eq!(HealthGrade::from_score(79), HealthGrade::B);
        assert_eq!(HealthGrade::from_score(60), HealthGrade::B);
        assert_eq!(HealthGrade::from_score(40), HealthGrade::C);
        assert_eq!(HealthGrade::from_score(39), HealthGrade::D);
        assert_eq!(HealthGrade::from_score(0), HealthGrade::D);
    }

    #[test]
    fn status_counts_serialize_with_status_names() {
        let mut counts = OrderCounts::default();
        counts.by_status.insert(OrderStatus::Delivered, 2);
        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(json["byStatus"]["delivered"], 2);
    }
}
