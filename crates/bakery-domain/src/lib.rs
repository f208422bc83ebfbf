//! bakery-domain
//!
//! Pure domain models (Order, Expense, Budget, derived Transaction, DateWindow)
//! and the report payloads built from them.
//! No I/O, no storage, no services. Only data types, enums and tolerant decoding.

pub mod budget;
pub mod common;
pub mod expense;
pub mod ledger;
pub mod lenient;
pub mod order;
pub mod query;
pub mod report;

pub use budget::*;
pub use common::*;
pub use expense::*;
pub use ledger::*;
pub use order::*;
pub use query::*;
pub use report::*;
