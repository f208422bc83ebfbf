//! Projects orders and expenses into the unified transaction ledger.

use std::cmp::{Ordering, Reverse};

use bakery_domain::{
    Amounted, Dated, Expense, FilteredStats, Order, OrderStatus, SortOrder, Transaction,
    TransactionKind, TransactionQuery, TransactionSource, SALES_CATEGORY,
};
use chrono::NaiveDate;
use tracing::debug;

use crate::{
    storage::{ExpenseFilter, OrderFilter, RecordStore},
    CoreResult,
};

const CSV_HEADER: &str = "Date,Type,Category,Description,Amount,Status,Payment Method";

pub struct LedgerService;

impl LedgerService {
    pub fn income_transaction(order: &Order) -> Transaction {
        let mut description = format!("Order #{}", order.order_number);
        if order.line_items().is_empty() {
            if let Some(product) = order.product.as_deref().filter(|p| !p.trim().is_empty()) {
                description.push_str(" - ");
                description.push_str(product);
            }
        }
        Transaction {
            id: order.order_number.clone(),
            kind: TransactionKind::Income,
            category: SALES_CATEGORY.to_string(),
            description,
            amount: order.amount(),
            status: order.status,
            date: order.occurred_at(),
            source: TransactionSource::Order {
                order_number: order.order_number.clone(),
                customer: order.customer_name().map(str::to_string),
            },
        }
    }

    /// Expenses are always booked as completed.
    pub fn expense_transaction(expense: &Expense) -> Transaction {
        Transaction {
            id: expense.id.to_string(),
            kind: TransactionKind::Expense,
            category: expense.category().to_string(),
            description: expense.description.clone(),
            amount: expense.amount(),
            status: OrderStatus::Completed,
            date: expense.occurred_at(),
            source: TransactionSource::Expense {
                payment_method: expense.payment_method().to_string(),
                note: expense.note.clone(),
            },
        }
    }

    /// Merges both record kinds, newest first. Ties keep orders before
    /// expenses in store order; undated rows go last.
    pub fn unify(orders: &[Order], expenses: &[Expense]) -> Vec<Transaction> {
        let mut transactions: Vec<Transaction> = orders
            .iter()
            .map(Self::income_transaction)
            .chain(expenses.iter().map(Self::expense_transaction))
            .collect();
        transactions.sort_by_key(|txn| Reverse(txn.date));
        transactions
    }

    pub fn transactions(store: &dyn RecordStore) -> CoreResult<Vec<Transaction>> {
        let orders = store.find_orders(&OrderFilter::all())?;
        let expenses = store.find_expenses(&ExpenseFilter::all())?;
        let transactions = Self::unify(&orders, &expenses);
        debug!(
            "unified {} orders and {} expenses into {} transactions",
            orders.len(),
            expenses.len(),
            transactions.len()
        );
        Ok(transactions)
    }

    /// Applies kind, category, range and search filters, then sorts.
    pub fn query(
        transactions: &[Transaction],
        query: &TransactionQuery,
        today: NaiveDate,
    ) -> Vec<Transaction> {
        let needle = query
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let category = query
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"));

        let mut matched: Vec<Transaction> = transactions
            .iter()
            .filter(|txn| query.kind.map_or(true, |kind| txn.kind == kind))
            .filter(|txn| category.map_or(true, |category| txn.category == category))
            .filter(|txn| query.range.matches(txn.occurred_on(), today))
            .filter(|txn| {
                needle
                    .as_deref()
                    .map_or(true, |needle| Self::matches_search(txn, needle))
            })
            .cloned()
            .collect();
        Self::sort(&mut matched, query.sort);
        matched
    }

    pub fn sort(transactions: &mut [Transaction], order: SortOrder) {
        match order {
            SortOrder::DateDesc => transactions.sort_by_key(|txn| Reverse(txn.date)),
            SortOrder::DateAsc => transactions.sort_by_key(|txn| txn.date),
            SortOrder::AmountDesc => transactions.sort_by(|a, b| compare_amounts(b, a)),
            SortOrder::AmountAsc => transactions.sort_by(compare_amounts),
        }
    }

    pub fn stats(transactions: &[Transaction]) -> FilteredStats {
        FilteredStats::from_transactions(transactions)
    }

    /// Renders the rows as CSV, every field quoted.
    pub fn to_csv(transactions: &[Transaction]) -> String {
        let mut out = String::from(CSV_HEADER);
        out.push('\n');
        for txn in transactions {
            let date = txn
                .occurred_on()
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "N/A".to_string());
            let fields = [
                date,
                txn.kind.to_string(),
                txn.category.clone(),
                txn.description.clone(),
                txn.amount.to_string(),
                txn.status.to_string(),
                txn.payment_method().unwrap_or("N/A").to_string(),
            ];
            let row: Vec<String> = fields.iter().map(|field| quote(field)).collect();
            out.push_str(&row.join(","));
            out.push('\n');
        }
        out
    }

    fn matches_search(txn: &Transaction, needle: &str) -> bool {
        [
            Some(txn.description.as_str()),
            Some(txn.category.as_str()),
            txn.customer(),
            txn.order_number(),
        ]
        .into_iter()
        .flatten()
        .any(|haystack| haystack.to_lowercase().contains(needle))
    }
}

fn compare_amounts(a: &Transaction, b: &Transaction) -> Ordering {
    a.amount.partial_cmp(&b.amount).unwrap_or(Ordering::Equal)
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
