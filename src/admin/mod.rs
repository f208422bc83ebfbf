//! In-process back office: typed admin actions in, response envelopes out.
//!
//! [`BackOffice`] checks the session, runs one action against the configured
//! [`RecordStore`] and wraps the outcome in an [`AdminResponse`]. Failures
//! never escape as errors; they become `success: false` envelopes carrying
//! the HTTP-style status of the underlying [`AppError`].

mod request;
mod response;
mod session;

pub use request::{parse_status, AdminAction, AdminRequest};
pub use response::AdminResponse;
pub use session::{SessionValidator, StaticTokenValidator, TrustedLocal};

use bakery_config::Config;
use bakery_core::{
    AggregationService, BudgetService, Clock, CoreError, ExpenseService, LedgerService,
    OrderService, RecordStore, SummaryOptions, SummaryService, SystemClock,
};
use bakery_domain::{Amounted, OrderCounts, Transaction, TransactionQuery, TransitionPolicy};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::errors::{AppError, AppResult};

/// Order counters plus booked revenue, as shown on the dashboard header.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(flatten)]
    pub orders: OrderCounts,
    pub total_revenue: f64,
    pub total_expenses: f64,
}

/// Message and payload of a successful action.
struct Outcome {
    message: String,
    data: Option<Value>,
}

impl Outcome {
    fn with_data<T: Serialize>(message: impl Into<String>, data: &T) -> AppResult<Self> {
        Ok(Self {
            message: message.into(),
            data: Some(serde_json::to_value(data)?),
        })
    }

    fn message(message: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            message: message.into(),
            data: None,
        })
    }
}

pub struct BackOffice {
    store: Box<dyn RecordStore>,
    clock: Box<dyn Clock>,
    sessions: Box<dyn SessionValidator>,
    config: Config,
}

impl BackOffice {
    pub fn new(store: Box<dyn RecordStore>, sessions: Box<dyn SessionValidator>) -> Self {
        Self::from_config(Config::default(), store, sessions)
    }

    /// Back office tuned by the persisted configuration.
    pub fn from_config(
        config: Config,
        store: Box<dyn RecordStore>,
        sessions: Box<dyn SessionValidator>,
    ) -> Self {
        Self {
            store,
            clock: Box::new(SystemClock),
            sessions,
            config,
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.config.transition_policy = policy;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn summary_options(&self) -> SummaryOptions {
        SummaryOptions {
            trailing_months: self.config.trailing_months,
            top_products_limit: self.config.top_products_limit,
        }
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Parses and handles a raw JSON request body.
    pub fn handle_json(&self, body: &str) -> AdminResponse {
        match AdminRequest::from_json(body) {
            Ok(request) => self.handle(request),
            Err(err) => {
                warn!("rejected admin request: {}", err);
                AdminResponse::from(err)
            }
        }
    }

    pub fn handle(&self, request: AdminRequest) -> AdminResponse {
        let name = request.action.name();
        let mutation = request.action.is_mutation();
        if !self.sessions.authorize(request.token.as_deref()) {
            warn!("unauthorized {} request", name);
            return AdminResponse::from(AppError::from(CoreError::Unauthorized));
        }

        match self.execute(request.action) {
            Ok(outcome) => {
                if mutation {
                    info!("{} applied: {}", name, outcome.message);
                } else {
                    debug!("{} succeeded", name);
                }
                AdminResponse::ok(outcome.message, outcome.data)
            }
            Err(err) => {
                warn!("{} failed: {}", name, err);
                AdminResponse::from(err)
            }
        }
    }

    fn execute(&self, action: AdminAction) -> AppResult<Outcome> {
        let store = self.store.as_ref();
        let clock = self.clock.as_ref();

        match action {
            AdminAction::GetTransactions(query) => {
                let transactions = self.query_transactions(&query)?;
                let stats = LedgerService::stats(&transactions);
                Outcome::with_data(
                    format!("{} transactions", transactions.len()),
                    &json!({ "transactions": transactions, "stats": stats }),
                )
            }
            AdminAction::AddExpense(draft) => {
                let expense = ExpenseService::add(store, clock, draft)?;
                Outcome::with_data(
                    format!(
                        "Expense added successfully ({})",
                        self.config.format_amount(expense.amount())
                    ),
                    &expense,
                )
            }
            AdminAction::DeleteExpense { id } => {
                ExpenseService::delete(store, id)?;
                Outcome::message("Expense deleted successfully")
            }
            AdminAction::GetExpenses => {
                let expenses = ExpenseService::list(store)?;
                Outcome::with_data(format!("{} expenses", expenses.len()), &expenses)
            }
            AdminAction::GetFinancialSummary => {
                let summary =
                    SummaryService::financial_summary(store, clock, self.summary_options())?;
                Outcome::with_data("Financial summary generated", &summary)
            }
            AdminAction::SaveBudget(budget) => {
                let saved = BudgetService::save(store, clock, budget)?;
                Outcome::with_data("Budget saved successfully", &saved)
            }
            AdminAction::GetOrders => {
                let orders = OrderService::list(store)?;
                Outcome::with_data(format!("{} orders", orders.len()), &orders)
            }
            AdminAction::GetStats => {
                let stats = self.dashboard_stats()?;
                Outcome::with_data("Order statistics", &stats)
            }
            AdminAction::UpdateOrderStatus {
                order_number,
                status,
            } => {
                let next = parse_status(&status)?;
                let order = OrderService::set_status(
                    store,
                    clock,
                    self.config.transition_policy,
                    &order_number,
                    next,
                )?;
                Outcome::with_data(
                    format!("Order {} is now {}", order.order_number, order.status),
                    &order,
                )
            }
            AdminAction::AddOrderNote { order_number, note } => {
                let order = OrderService::append_note(store, clock, &order_number, &note)?;
                Outcome::with_data("Note added successfully", &order)
            }
            AdminAction::DeleteOrder { order_number } => {
                OrderService::delete(store, &order_number)?;
                Outcome::message(format!("Order {} deleted", order_number))
            }
            AdminAction::ExportTransactions(query) => {
                let transactions = self.query_transactions(&query)?;
                let filename = format!(
                    "bakery-transactions-{}.csv",
                    clock.today().format("%Y-%m-%d")
                );
                info!("exporting {} transactions", transactions.len());
                Outcome::with_data(
                    format!("Exported {} transactions", transactions.len()),
                    &json!({
                        "filename": filename,
                        "rows": transactions.len(),
                        "csv": LedgerService::to_csv(&transactions),
                    }),
                )
            }
        }
    }

    fn query_transactions(&self, query: &TransactionQuery) -> AppResult<Vec<Transaction>> {
        let all = LedgerService::transactions(self.store.as_ref())?;
        Ok(LedgerService::query(&all, query, self.clock.today()))
    }

    fn dashboard_stats(&self) -> AppResult<DashboardStats> {
        let orders = OrderService::list(self.store.as_ref())?;
        let expenses = ExpenseService::list(self.store.as_ref())?;
        Ok(DashboardStats {
            orders: AggregationService::order_counts(&orders),
            total_revenue: AggregationService::total_revenue(&orders),
            total_expenses: AggregationService::total_expenses(&expenses),
        })
    }
}
