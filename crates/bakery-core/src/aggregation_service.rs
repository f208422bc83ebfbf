//! Windowed sums and breakdowns re-derived from raw orders and expenses.
//!
//! Nothing here fails on malformed records: missing amounts count as zero and
//! undated records drop out of windowed figures while still counting all-time.

use std::collections::{BTreeMap, HashMap};

use bakery_domain::{
    add_up, finite_or_zero, first_of_month, month_label, shift_month, Amounted, DailyRevenue, DateWindow,
    Dated, Expense, MonthlyRollup, Order, OrderCounts, OrderStatus, PeriodTotals, ProductRanking,
    DEFAULT_PAYMENT_METHOD,
};
use chrono::{Datelike, NaiveDate};

/// Category used for line items that carry none.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// The fixed set of calendar windows the dashboard reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingWindows {
    pub today: DateWindow,
    pub this_month: DateWindow,
    pub last_month: DateWindow,
    pub this_quarter: DateWindow,
    pub this_year: DateWindow,
}

impl ReportingWindows {
    pub fn for_day(today: NaiveDate) -> Self {
        Self {
            today: DateWindow::day(today),
            this_month: DateWindow::month_of(today),
            last_month: DateWindow::previous_month_of(today),
            this_quarter: DateWindow::quarter_of(today),
            this_year: DateWindow::year_of(today),
        }
    }
}

pub struct AggregationService;

impl AggregationService {
    /// Revenue from delivered or completed orders placed inside `window`.
    pub fn revenue_in(orders: &[Order], window: &DateWindow) -> f64 {
        add_up(
            orders
                .iter()
                .filter(|order| {
                    order.counts_as_revenue() && window.contains_instant(order.occurred_at())
                })
                .map(Amounted::amount),
        )
    }

    pub fn expenses_in(expenses: &[Expense], window: &DateWindow) -> f64 {
        add_up(
            expenses
                .iter()
                .filter(|expense| window.contains_instant(expense.occurred_at()))
                .map(Amounted::amount),
        )
    }

    pub fn total_revenue(orders: &[Order]) -> f64 {
        add_up(
            orders
                .iter()
                .filter(|order| order.counts_as_revenue())
                .map(Amounted::amount),
        )
    }

    pub fn total_expenses(expenses: &[Expense]) -> f64 {
        add_up(expenses.iter().map(Amounted::amount))
    }

    pub fn window_totals(orders: &[Order], expenses: &[Expense], window: DateWindow) -> PeriodTotals {
        PeriodTotals::from_parts(
            Some(window),
            Self::revenue_in(orders, &window),
            Self::expenses_in(expenses, &window),
        )
    }

    pub fn all_time_totals(orders: &[Order], expenses: &[Expense]) -> PeriodTotals {
        PeriodTotals::from_parts(None, Self::total_revenue(orders), Self::total_expenses(expenses))
    }

    /// Month-over-month change in percent; zero when last month had no revenue.
    pub fn revenue_growth(this_month: f64, last_month: f64) -> f64 {
        if last_month == 0.0 {
            return 0.0;
        }
        finite_or_zero((this_month - last_month) / last_month * 100.0)
    }

    pub fn average_order_value(orders: &[Order]) -> f64 {
        let count = orders.iter().filter(|order| order.counts_as_revenue()).count();
        if count == 0 {
            return 0.0;
        }
        finite_or_zero(Self::total_revenue(orders) / count as f64)
    }

    pub fn profit_margin(revenue: f64, profit: f64) -> f64 {
        if revenue <= 0.0 {
            return 0.0;
        }
        finite_or_zero(profit / revenue * 100.0)
    }

    /// Trailing calendar months ending with the month of `today`, oldest first.
    pub fn monthly_breakdown(
        orders: &[Order],
        expenses: &[Expense],
        today: NaiveDate,
        months: usize,
    ) -> Vec<MonthlyRollup> {
        let current = first_of_month(today);
        (0..months as i32)
            .rev()
            .map(|back| {
                let start = shift_month(current, -back);
                let window = DateWindow::month_of(start);
                let revenue = Self::revenue_in(orders, &window);
                let spent = Self::expenses_in(expenses, &window);
                MonthlyRollup {
                    label: month_label(start),
                    year: start.year(),
                    month: start.month(),
                    orders: orders
                        .iter()
                        .filter(|order| window.contains_instant(order.occurred_at()))
                        .count(),
                    revenue,
                    expenses: spent,
                    profit: revenue - spent,
                }
            })
            .collect()
    }

    /// Revenue for every day of the current month, including days still ahead.
    pub fn daily_revenue(orders: &[Order], today: NaiveDate) -> Vec<DailyRevenue> {
        let mut by_day: HashMap<NaiveDate, f64> = HashMap::new();
        let month = DateWindow::month_of(today);
        for order in orders.iter().filter(|order| order.counts_as_revenue()) {
            if let Some(day) = order.occurred_on().filter(|day| month.contains(*day)) {
                *by_day.entry(day).or_default() += order.amount();
            }
        }
        month
            .days()
            .map(|day| DailyRevenue::new(day, by_day.get(&day).copied().unwrap_or(0.0)))
            .collect()
    }

    /// Line-item revenue per item category, over revenue-eligible orders.
    pub fn category_revenue(orders: &[Order]) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for item in orders
            .iter()
            .filter(|order| order.counts_as_revenue())
            .flat_map(Order::line_items)
        {
            let category = item.category.as_deref().unwrap_or(UNCATEGORIZED);
            *totals.entry(category.to_string()).or_insert(0.0) += item.line_total();
        }
        totals
    }

    /// Spend per category, restricted to `window` when one is given.
    pub fn expense_categories(
        expenses: &[Expense],
        window: Option<&DateWindow>,
    ) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for expense in expenses.iter().filter(|expense| {
            window.map_or(true, |window| window.contains_instant(expense.occurred_at()))
        }) {
            *totals.entry(expense.category().to_string()).or_insert(0.0) += expense.amount();
        }
        totals
    }

    pub fn payment_method_revenue(orders: &[Order]) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for order in orders.iter().filter(|order| order.counts_as_revenue()) {
            let method = order
                .payment
                .method
                .as_deref()
                .unwrap_or(DEFAULT_PAYMENT_METHOD);
            *totals.entry(method.to_string()).or_insert(0.0) += order.amount();
        }
        totals
    }

    /// Best sellers by revenue. Equal revenue keeps first-seen order.
    pub fn top_products(orders: &[Order], limit: usize) -> Vec<ProductRanking> {
        let mut rankings: Vec<ProductRanking> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for item in orders
            .iter()
            .filter(|order| order.counts_as_revenue())
            .flat_map(Order::line_items)
        {
            let Some(name) = item.name.as_deref() else {
                continue;
            };
            let slot = *index.entry(name.to_string()).or_insert_with(|| {
                rankings.push(ProductRanking {
                    name: name.to_string(),
                    quantity: 0,
                    revenue: 0.0,
                });
                rankings.len() - 1
            });
            let ranking = &mut rankings[slot];
            ranking.quantity += u64::from(item.quantity.unwrap_or(0));
            ranking.revenue += item.line_total();
        }
        rankings.sort_by(|a, b| {
            b.revenue
                .partial_cmp(&a.revenue)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        rankings.truncate(limit);
        rankings
    }

    pub fn order_counts(orders: &[Order]) -> OrderCounts {
        let mut counts = OrderCounts {
            total: orders.len(),
            ..OrderCounts::default()
        };
        for order in orders {
            *counts.by_status.entry(order.status).or_insert(0) += 1;
            match order.status {
                OrderStatus::Pending => counts.pending += 1,
                OrderStatus::Cancelled => counts.cancelled += 1,
                status if status.counts_as_revenue() => counts.completed += 1,
                _ => {}
            }
        }
        counts
    }
}
