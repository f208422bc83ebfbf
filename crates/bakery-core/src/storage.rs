use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use bakery_domain::{Budget, Expense, Order, OrderNote, OrderStatus};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{CoreError, CoreResult};

/// Selects orders by exact field match. Empty filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub order_number: Option<String>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_number(order_number: impl Into<String>) -> Self {
        Self {
            order_number: Some(order_number.into()),
            status: None,
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.order_number
            .as_deref()
            .map_or(true, |number| order.order_number == number)
            && self.status.map_or(true, |status| order.status == status)
    }
}

/// Field updates applied to a single order in one store operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    /// Appended to the notes list, never replacing existing notes.
    pub push_note: Option<OrderNote>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl OrderPatch {
    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn note(mut self, note: OrderNote) -> Self {
        self.push_note = Some(note);
        self
    }

    pub fn touched(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = Some(at);
        self
    }

    /// Applies the patch in place. A pushed note never lands before the
    /// latest existing note, so note timestamps stay non-decreasing.
    pub fn apply(&self, order: &mut Order) {
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(note) = &self.push_note {
            let mut note = note.clone();
            if let Some(last) = order.last_note_at() {
                note.timestamp = note.timestamp.max(last);
            }
            order.notes.push(note);
        }
        if let Some(updated_at) = self.updated_at {
            order.updated_at = Some(updated_at);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub id: Option<Uuid>,
    pub category: Option<String>,
}

impl ExpenseFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: Uuid) -> Self {
        Self {
            id: Some(id),
            category: None,
        }
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        self.id.map_or(true, |id| expense.id == id)
            && self
                .category
                .as_deref()
                .map_or(true, |category| expense.category() == category)
    }
}

/// Document store holding the orders, expenses and budget collections.
///
/// Every call is a single operation on one collection; implementations must make
/// each one atomic with respect to concurrent callers.
pub trait RecordStore: Send + Sync {
    fn find_orders(&self, filter: &OrderFilter) -> CoreResult<Vec<Order>>;
    fn insert_order(&self, order: &Order) -> CoreResult<()>;
    /// Patches the first matching order and returns it post-update.
    fn update_order(&self, filter: &OrderFilter, patch: &OrderPatch) -> CoreResult<Option<Order>>;
    /// Deletes the first matching order, returning how many were removed.
    fn delete_order(&self, filter: &OrderFilter) -> CoreResult<usize>;

    fn find_expenses(&self, filter: &ExpenseFilter) -> CoreResult<Vec<Expense>>;
    fn insert_expense(&self, expense: &Expense) -> CoreResult<()>;
    fn delete_expense(&self, filter: &ExpenseFilter) -> CoreResult<usize>;

    fn find_budget(&self) -> CoreResult<Option<Budget>>;
    /// Replaces the singleton budget document, creating it when absent.
    fn upsert_budget(&self, budget: &Budget) -> CoreResult<()>;
}

/// In-process store used by tests and the demo CLI.
#[derive(Debug, Default)]
pub struct MemoryStore {
    orders: RwLock<Vec<Order>>,
    expenses: RwLock<Vec<Expense>>,
    budget: RwLock<Option<Budget>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(orders: Vec<Order>, expenses: Vec<Expense>) -> Self {
        Self {
            orders: RwLock::new(orders),
            expenses: RwLock::new(expenses),
            budget: RwLock::new(None),
        }
    }

    pub fn with_budget(self, budget: Budget) -> Self {
        Self {
            budget: RwLock::new(Some(budget)),
            ..self
        }
    }
}

fn read<T>(lock: &RwLock<T>) -> CoreResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| CoreError::StoreUnavailable("memory store lock poisoned".into()))
}

fn write<T>(lock: &RwLock<T>) -> CoreResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| CoreError::StoreUnavailable("memory store lock poisoned".into()))
}

impl RecordStore for MemoryStore {
    fn find_orders(&self, filter: &OrderFilter) -> CoreResult<Vec<Order>> {
        Ok(read(&self.orders)?
            .iter()
            .filter(|order| filter.matches(order))
            .cloned()
            .collect())
    }

    fn insert_order(&self, order: &Order) -> CoreResult<()> {
        write(&self.orders)?.push(order.clone());
        Ok(())
    }

    fn update_order(&self, filter: &OrderFilter, patch: &OrderPatch) -> CoreResult<Option<Order>> {
        let mut orders = write(&self.orders)?;
        Ok(orders
            .iter_mut()
            .find(|order| filter.matches(order))
            .map(|order| {
                patch.apply(order);
                order.clone()
            }))
    }

    fn delete_order(&self, filter: &OrderFilter) -> CoreResult<usize> {
        let mut orders = write(&self.orders)?;
        match orders.iter().position(|order| filter.matches(order)) {
            Some(index) => {
                orders.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn find_expenses(&self, filter: &ExpenseFilter) -> CoreResult<Vec<Expense>> {
        Ok(read(&self.expenses)?
            .iter()
            .filter(|expense| filter.matches(expense))
            .cloned()
            .collect())
    }

    fn insert_expense(&self, expense: &Expense) -> CoreResult<()> {
        write(&self.expenses)?.push(expense.clone());
        Ok(())
    }

    fn delete_expense(&self, filter: &ExpenseFilter) -> CoreResult<usize> {
        let mut expenses = write(&self.expenses)?;
        match expenses.iter().position(|expense| filter.matches(expense)) {
            Some(index) => {
                expenses.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn find_budget(&self) -> CoreResult<Option<Budget>> {
        Ok(read(&self.budget)?.clone())
    }

    fn upsert_budget(&self, budget: &Budget) -> CoreResult<()> {
        *write(&self.budget)? = Some(budget.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, hour, 0, 0).unwrap()
    }

    fn order(number: &str) -> Order {
        let mut order = Order::legacy("Nimali", "Chocolate Cake");
        order.order_number = number.to_string();
        order
    }

    #[test]
    fn update_touches_only_the_first_match() {
        let store = MemoryStore::with_records(vec![order("ASI1"), order("ASI1")], vec![]);
        let patch = OrderPatch::default().status(OrderStatus::Confirmed);
        let updated = store
            .update_order(&OrderFilter::by_number("ASI1"), &patch)
            .unwrap()
            .expect("order matched");
        assert_eq!(updated.status, OrderStatus::Confirmed);
        let statuses: Vec<_> = store
            .find_orders(&OrderFilter::all())
            .unwrap()
            .into_iter()
            .map(|order| order.status)
            .collect();
        assert_eq!(statuses, vec![OrderStatus::Confirmed, OrderStatus::Pending]);
    }

    #[test]
    fn pushed_notes_never_go_backwards() {
        let store = MemoryStore::with_records(vec![order("ASI1")], vec![]);
        let filter = OrderFilter::by_number("ASI1");
        let later = OrderNote {
            text: "baked".into(),
            timestamp: instant(10),
        };
        let earlier = OrderNote {
            text: "iced".into(),
            timestamp: instant(9),
        };
        store
            .update_order(&filter, &OrderPatch::default().note(later))
            .unwrap();
        let updated = store
            .update_order(&filter, &OrderPatch::default().note(earlier))
            .unwrap()
            .unwrap();
        assert_eq!(updated.notes.len(), 2);
        assert_eq!(updated.notes[1].timestamp, instant(10));
    }

    #[test]
    fn status_filter_narrows_matches() {
        let store = MemoryStore::with_records(vec![order("ASI1")], vec![]);
        let filter = OrderFilter::by_number("ASI1").with_status(OrderStatus::Ready);
        assert!(store.find_orders(&filter).unwrap().is_empty());
        assert_eq!(store.delete_order(&filter).unwrap(), 0);
        assert_eq!(store.delete_order(&OrderFilter::by_number("ASI1")).unwrap(), 1);
    }

    #[test]
    fn budget_upsert_replaces_singleton() {
        let store = MemoryStore::new();
        assert!(store.find_budget().unwrap().is_none());
        store.upsert_budget(&Budget::new(1000.0)).unwrap();
        store.upsert_budget(&Budget::new(2000.0)).unwrap();
        assert_eq!(store.find_budget().unwrap().unwrap().monthly_budget, Some(2000.0));
    }
}
