#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use bakery_ledger::{
    admin::{BackOffice, StaticTokenValidator},
    bakery_core::{FixedClock, OrderService},
    bakery_domain::{Customer, Order, OrderItem, Payment},
    bakery_storage_json::JsonRecordStore,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use tempfile::TempDir;

pub const TOKEN: &str = "back-office-token";

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
}

pub fn clock() -> FixedClock {
    FixedClock::on(today())
}

/// Creates a back office over a JSON store in a unique directory, with the
/// clock pinned to [`today`].
pub fn setup_test_env() -> (BackOffice, PathBuf) {
    let temp = TempDir::new().expect("create temp dir");
    let data_dir = temp.path().join("data");
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let store = JsonRecordStore::new(data_dir.clone()).expect("create json record store");
    let office = BackOffice::new(
        Box::new(store),
        Box::new(StaticTokenValidator::new([TOKEN])),
    )
    .with_clock(Box::new(clock()));

    (office, data_dir)
}

/// Records a pending cart order worth `price × quantity`.
pub fn place_order(office: &BackOffice, number: &str, product: &str, price: f64, quantity: u32) {
    let mut order = Order::from_cart(
        Customer::named("Nimali Perera"),
        vec![OrderItem::new(product, price, quantity).with_category("Cakes")],
        Payment::method("cash"),
    );
    order.order_number = number.to_string();
    OrderService::record(office.store(), &clock(), order).expect("record order");
}
