//! bakery-core
//!
//! Business logic for the bakery back office: order lifecycle, unified ledger,
//! aggregation, budget tracking and health scoring.
//! Depends on bakery-domain. Persistence goes through the `RecordStore` trait.

pub mod aggregation_service;
pub mod budget_service;
pub mod error;
pub mod expense_service;
pub mod health_service;
pub mod ledger_service;
pub mod order_service;
pub mod storage;
pub mod summary_service;
pub mod time;

pub use aggregation_service::*;
pub use budget_service::*;
pub use error::{CoreError, CoreResult};
pub use expense_service::*;
pub use health_service::*;
pub use ledger_service::*;
pub use order_service::*;
pub use storage::{ExpenseFilter, MemoryStore, OrderFilter, OrderPatch, RecordStore};
pub use summary_service::*;
pub use time::{Clock, FixedClock, SystemClock};
