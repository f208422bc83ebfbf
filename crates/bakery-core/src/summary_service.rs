//! Composes the dashboard payload from a single snapshot of the records.

use bakery_domain::{Budget, Expense, FinancialSummary, HealthInputs, Order};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{
    aggregation_service::{AggregationService, ReportingWindows},
    budget_service::BudgetService,
    health_service::HealthService,
    storage::{ExpenseFilter, OrderFilter, RecordStore},
    time::Clock,
    CoreResult,
};

/// Tunables for the summary: series length and best-seller list size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    pub trailing_months: usize,
    pub top_products_limit: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            trailing_months: 12,
            top_products_limit: 10,
        }
    }
}

pub struct SummaryService;

impl SummaryService {
    /// Loads every record and derives the summary as of `clock.now()`.
    pub fn financial_summary(
        store: &dyn RecordStore,
        clock: &dyn Clock,
        options: SummaryOptions,
    ) -> CoreResult<FinancialSummary> {
        let orders = store.find_orders(&OrderFilter::all())?;
        let expenses = store.find_expenses(&ExpenseFilter::all())?;
        let budget = store.find_budget()?;
        debug!(
            "summarizing {} orders, {} expenses (budget configured: {})",
            orders.len(),
            expenses.len(),
            budget.is_some()
        );
        Ok(Self::compute(&orders, &expenses, budget, clock.now(), options))
    }

    pub fn compute(
        orders: &[Order],
        expenses: &[Expense],
        budget: Option<Budget>,
        now: DateTime<Utc>,
        options: SummaryOptions,
    ) -> FinancialSummary {
        let today = now.date_naive();
        let windows = ReportingWindows::for_day(today);

        let all_time = AggregationService::all_time_totals(orders, expenses);
        let this_month = AggregationService::window_totals(orders, expenses, windows.this_month);
        let last_month = AggregationService::window_totals(orders, expenses, windows.last_month);
        let revenue_growth = AggregationService::revenue_growth(this_month.revenue, last_month.revenue);
        let profit_margin = AggregationService::profit_margin(all_time.revenue, all_time.profit);

        let expense_categories =
            AggregationService::expense_categories(expenses, Some(&windows.this_month));
        let budget_report =
            BudgetService::track(budget.as_ref(), this_month.expenses, &expense_categories);
        let health = HealthService::score(HealthInputs {
            profit_margin,
            revenue_growth,
            budget_adherence: budget_report.adherence,
        });

        FinancialSummary {
            generated_at: now,
            today: AggregationService::window_totals(orders, expenses, windows.today),
            this_quarter: AggregationService::window_totals(orders, expenses, windows.this_quarter),
            this_year: AggregationService::window_totals(orders, expenses, windows.this_year),
            all_time,
            this_month,
            last_month,
            revenue_growth,
            profit_margin,
            avg_order_value: AggregationService::average_order_value(orders),
            orders: AggregationService::order_counts(orders),
            monthly_breakdown: AggregationService::monthly_breakdown(
                orders,
                expenses,
                today,
                options.trailing_months,
            ),
            daily_revenue: AggregationService::daily_revenue(orders, today),
            category_revenue: AggregationService::category_revenue(orders),
            expense_categories,
            all_time_expense_categories: AggregationService::expense_categories(expenses, None),
            payment_methods: AggregationService::payment_method_revenue(orders),
            top_products: AggregationService::top_products(orders, options.top_products_limit),
            budget,
            budget_report,
            health,
        }
    }
}
