use std::cmp::Reverse;

use bakery_domain::{
    Dated, Displayable, Expense, ExpenseDraft, DEFAULT_EXPENSE_CATEGORY, DEFAULT_PAYMENT_METHOD,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    storage::{ExpenseFilter, RecordStore},
    time::Clock,
    CoreError, CoreResult,
};

/// Operator-entered expenses: created and deleted, never edited.
pub struct ExpenseService;

impl ExpenseService {
    pub fn add(store: &dyn RecordStore, clock: &dyn Clock, draft: ExpenseDraft) -> CoreResult<Expense> {
        let description = draft.description.trim();
        if description.is_empty() {
            return Err(CoreError::invalid("expense description is required"));
        }
        let amount = draft
            .amount
            .filter(|amount| amount.is_finite() && *amount > 0.0)
            .ok_or_else(|| CoreError::invalid("expense amount must be a positive number"))?;

        let now = clock.now();
        let expense = Expense {
            id: Uuid::new_v4(),
            description: description.to_string(),
            amount: Some(amount),
            category: Some(
                draft
                    .category
                    .unwrap_or_else(|| DEFAULT_EXPENSE_CATEGORY.to_string()),
            ),
            date: Some(draft.date.unwrap_or(now)),
            payment_method: Some(
                draft
                    .payment_method
                    .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string()),
            ),
            note: draft
                .note
                .map(|note| note.trim().to_string())
                .filter(|note| !note.is_empty()),
            created_at: Some(now),
        };
        store.insert_expense(&expense)?;
        info!("recorded {} for {:.2}", expense.display_label(), amount);
        Ok(expense)
    }

    pub fn delete(store: &dyn RecordStore, id: Uuid) -> CoreResult<()> {
        if store.delete_expense(&ExpenseFilter::by_id(id))? == 0 {
            return Err(CoreError::expense_not_found(id));
        }
        info!("deleted expense {}", id);
        Ok(())
    }

    /// Newest booking date first.
    pub fn list(store: &dyn RecordStore) -> CoreResult<Vec<Expense>> {
        let mut expenses = store.find_expenses(&ExpenseFilter::all())?;
        expenses.sort_by_key(|expense| Reverse(expense.occurred_at()));
        Ok(expenses)
    }
}
