use bakery_domain::{Budget, ExpenseDraft, OrderStatus, TransactionQuery};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strsim::levenshtein;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use bakery_core::CoreError;

/// Maximum edit distance for a "did you mean" hint.
const SUGGESTION_DISTANCE: usize = 3;

/// Every operation the back office exposes, tagged by `action` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum AdminAction {
    GetTransactions(TransactionQuery),
    AddExpense(ExpenseDraft),
    #[serde(rename_all = "camelCase")]
    DeleteExpense {
        id: Uuid,
    },
    GetExpenses,
    GetFinancialSummary,
    SaveBudget(Budget),
    GetOrders,
    GetStats,
    #[serde(rename_all = "camelCase")]
    UpdateOrderStatus {
        order_number: String,
        status: String,
    },
    #[serde(rename_all = "camelCase")]
    AddOrderNote {
        order_number: String,
        #[serde(alias = "text")]
        note: String,
    },
    #[serde(rename_all = "camelCase")]
    DeleteOrder {
        order_number: String,
    },
    ExportTransactions(TransactionQuery),
}

impl AdminAction {
    pub const NAMES: [&'static str; 12] = [
        "get-transactions",
        "add-expense",
        "delete-expense",
        "get-expenses",
        "get-financial-summary",
        "save-budget",
        "get-orders",
        "get-stats",
        "update-order-status",
        "add-order-note",
        "delete-order",
        "export-transactions",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AdminAction::GetTransactions(_) => "get-transactions",
            AdminAction::AddExpense(_) => "add-expense",
            AdminAction::DeleteExpense { .. } => "delete-expense",
            AdminAction::GetExpenses => "get-expenses",
            AdminAction::GetFinancialSummary => "get-financial-summary",
            AdminAction::SaveBudget(_) => "save-budget",
            AdminAction::GetOrders => "get-orders",
            AdminAction::GetStats => "get-stats",
            AdminAction::UpdateOrderStatus { .. } => "update-order-status",
            AdminAction::AddOrderNote { .. } => "add-order-note",
            AdminAction::DeleteOrder { .. } => "delete-order",
            AdminAction::ExportTransactions(_) => "export-transactions",
        }
    }

    /// True for actions that write to the store.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            AdminAction::AddExpense(_)
                | AdminAction::DeleteExpense { .. }
                | AdminAction::SaveBudget(_)
                | AdminAction::UpdateOrderStatus { .. }
                | AdminAction::AddOrderNote { .. }
                | AdminAction::DeleteOrder { .. }
        )
    }
}

/// An authenticated action request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(flatten)]
    pub action: AdminAction,
}

impl AdminRequest {
    pub fn new(action: AdminAction) -> Self {
        Self {
            token: None,
            action,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Parses a JSON request body. An unknown `action` is reported with the
    /// closest known action name.
    pub fn from_json(body: &str) -> AppResult<Self> {
        let value: Value =
            serde_json::from_str(body).map_err(|err| AppError::Request(err.to_string()))?;
        let Some(action) = value.get("action").and_then(Value::as_str) else {
            return Err(AppError::Request("missing `action` field".into()));
        };
        if !AdminAction::NAMES.contains(&action) {
            let mut message = format!("unknown action `{}`", action);
            if let Some(best) = closest(action, AdminAction::NAMES) {
                message.push_str(&format!("; did you mean `{}`?", best));
            }
            return Err(AppError::Request(message));
        }
        serde_json::from_value(value).map_err(|err| AppError::Request(err.to_string()))
    }
}

/// Resolves a status name, suggesting the nearest one on a miss.
pub fn parse_status(input: &str) -> Result<OrderStatus, CoreError> {
    input.parse::<OrderStatus>().map_err(|err| {
        let names = OrderStatus::ALL.map(OrderStatus::as_str);
        let normalized = input.trim().to_ascii_lowercase();
        match closest(&normalized, names) {
            Some(best) => CoreError::invalid(format!("{}; did you mean `{}`?", err, best)),
            None => CoreError::invalid(err.to_string()),
        }
    })
}

fn closest<const N: usize>(input: &str, candidates: [&'static str; N]) -> Option<&'static str> {
    let mut suggestions: Vec<_> = candidates
        .into_iter()
        .map(|key| (levenshtein(key, input), key))
        .collect();
    suggestions.sort_by_key(|(distance, _)| *distance);

    suggestions
        .first()
        .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
        .map(|(_, best)| *best)
}
