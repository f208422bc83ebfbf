#![doc(test(attr(deny(warnings))))]

//! Bakery Ledger turns the storefront's order and expense records into the
//! back-office views: order lifecycle, unified ledger, financial summary,
//! budget tracking and business health.
//!
//! The business rules live in the workspace crates re-exported here; this
//! crate adds the admin dispatcher, tracing setup and the CLI.

pub mod admin;
pub mod errors;
pub mod utils;

pub use bakery_config;
pub use bakery_core;
pub use bakery_domain;
pub use bakery_storage_json;

use std::sync::Once;

use bakery_config::Config;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default filter.
pub fn init() {
    init_with_filter(&Config::default_log_filter());
}

/// Initializes global tracing with `directives` (ignored when `RUST_LOG` is set).
pub fn init_with_filter(directives: &str) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(directives);
        tracing::info!("Bakery Ledger tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init_with_filter("bakery_ledger=debug");
    }
}
