use std::fs;

use bakery_core::{
    AggregationService, BudgetService, ExpenseFilter, ExpenseService, FixedClock, OrderFilter, OrderService,
    RecordStore,
};
use bakery_domain::{
    Budget, Customer, ExpenseDraft, Order, OrderItem, OrderStatus, Payment, TransitionPolicy,
};
use bakery_storage_json::{JsonRecordStore, BUDGET_FILE, EXPENSES_FILE, ORDERS_FILE};
use chrono::NaiveDate;
use serde_json::Value;
use tempfile::tempdir;

fn clock() -> FixedClock {
    FixedClock::on(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
}

fn cake_order() -> Order {
    Order::from_cart(
        Customer::named("Nimali"),
        vec![OrderItem::new("Chocolate Cake", 1000.0, 2)],
        Payment::method("cash"),
    )
}

#[test]
fn orders_round_trip_through_files() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::new(dir.path().join("data")).expect("create store");

    let order = OrderService::record(&store, &clock(), cake_order()).expect("record");
    assert!(store.collection_path(ORDERS_FILE).exists());

    let updated = OrderService::set_status(
        &store,
        &clock(),
        TransitionPolicy::Strict,
        &order.order_number,
        OrderStatus::Confirmed,
    )
    .expect("confirm");
    OrderService::append_note(&store, &clock(), &updated.order_number, "collect at 5pm")
        .expect("note");

    let reopened = JsonRecordStore::new(dir.path().join("data")).expect("reopen");
    let stored = OrderService::get(&reopened, &order.order_number).expect("get");
    assert_eq!(stored.status, OrderStatus::Confirmed);
    assert_eq!(stored.notes.len(), 1);
    assert_eq!(stored.notes[0].text, "collect at 5pm");
}

#[test]
fn malformed_records_are_skipped_and_preserved() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::new(dir.path().to_path_buf()).expect("create store");
    fs::write(
        store.collection_path(ORDERS_FILE),
        r#"[
            "not an order",
            {"orderNumber": "ASI000001", "status": "ready", "product": "Lemon Blossom", "giftWrap": true}
        ]"#,
    )
    .expect("seed orders");

    let orders = store.find_orders(&OrderFilter::all()).expect("find");
    assert_eq!(orders.len(), 1);

    OrderService::set_status(
        &store,
        &clock(),
        TransitionPolicy::Strict,
        "ASI000001",
        OrderStatus::Delivered,
    )
    .expect("deliver");

    let raw: Value =
        serde_json::from_str(&fs::read_to_string(store.collection_path(ORDERS_FILE)).unwrap())
            .unwrap();
    assert_eq!(raw[0], "not an order");
    assert_eq!(raw[1]["status"], "delivered");
    assert_eq!(raw[1]["giftWrap"], true);
    assert!(raw[1]["updatedAt"].is_string());
}

#[test]
fn malformed_fields_never_drop_a_record() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::new(dir.path().to_path_buf()).expect("create store");
    fs::write(
        store.collection_path(ORDERS_FILE),
        r#"[
            {"orderNumber": "ASI000001", "status": "completed", "notes": null,
             "payment": {"total": 1000}},
            {"orderNumber": "ASI000002", "status": "completed", "payment": null,
             "items": [{"name": "Cupcakes", "price": 500, "quantity": 1}]},
            {"orderNumber": "ASI000003", "status": "completed", "customer": {"phone": 771234567},
             "payment": {"total": "600"}},
            {"orderNumber": "ASI000004", "status": "completed", "payment": {"total": 400},
             "notes": [{"text": "leave at gate", "timestamp": "2026-10-19"}]}
        ]"#,
    )
    .expect("seed orders");
    fs::write(
        store.collection_path(EXPENSES_FILE),
        r#"[{"id": "64f1c0ffee", "description": null, "amount": 300, "category": "Rent"}]"#,
    )
    .expect("seed expenses");

    let orders = store.find_orders(&OrderFilter::all()).expect("orders");
    assert_eq!(orders.len(), 4);
    assert_eq!(AggregationService::total_revenue(&orders), 2500.0);
    assert_eq!(orders[3].notes[0].text, "leave at gate");

    let expenses = store.find_expenses(&ExpenseFilter::all()).expect("expenses");
    assert_eq!(expenses.len(), 1);
    assert_eq!(AggregationService::total_expenses(&expenses), 300.0);

    ExpenseService::delete(&store, expenses[0].id).expect("legacy id deletes");
    assert!(store
        .find_expenses(&ExpenseFilter::all())
        .expect("expenses")
        .is_empty());
}

#[test]
fn expenses_and_budget_persist() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::new(dir.path().to_path_buf()).expect("create store");

    let expense = ExpenseService::add(
        &store,
        &clock(),
        ExpenseDraft::new("Flour", 500.0).category("Ingredients"),
    )
    .expect("add expense");
    assert!(store.collection_path(EXPENSES_FILE).exists());
    assert_eq!(
        store
            .find_expenses(&ExpenseFilter::by_id(expense.id))
            .expect("find")
            .len(),
        1
    );
    ExpenseService::delete(&store, expense.id).expect("delete");
    assert!(ExpenseService::delete(&store, uuid::Uuid::new_v4()).is_err());

    BudgetService::save(&store, &clock(), Budget::new(1000.0)).expect("save budget");
    BudgetService::save(&store, &clock(), Budget::new(1500.0)).expect("resave budget");
    let budget = store.find_budget().expect("find budget").expect("budget");
    assert_eq!(budget.monthly_budget, Some(1500.0));
    assert!(store.collection_path(BUDGET_FILE).exists());
    assert!(!dir.path().join("budget.json.tmp").exists());
}

#[test]
fn missing_files_read_as_empty() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::new(dir.path().join("fresh")).expect("create store");

    assert!(store.find_orders(&OrderFilter::all()).expect("orders").is_empty());
    assert!(store.find_expenses(&ExpenseFilter::all()).expect("expenses").is_empty());
    assert!(store.find_budget().expect("budget").is_none());
    assert_eq!(
        store.delete_order(&OrderFilter::by_number("ASI1")).expect("delete"),
        0
    );
}

#[test]
fn non_array_collection_is_unavailable() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::new(dir.path().to_path_buf()).expect("create store");
    fs::write(store.collection_path(ORDERS_FILE), r#"{"orders": []}"#).expect("seed");

    let err = store.find_orders(&OrderFilter::all()).unwrap_err();
    assert!(matches!(err, bakery_core::CoreError::StoreUnavailable(_)));
}
