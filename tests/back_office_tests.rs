mod common;

use bakery_ledger::admin::{AdminAction, AdminRequest, AdminResponse, BackOffice};
use bakery_ledger::bakery_domain::TransitionPolicy;
use common::{place_order, setup_test_env, TOKEN};
use insta::assert_snapshot;
use serde_json::{json, Value};

fn send(office: &BackOffice, mut body: Value) -> AdminResponse {
    body["token"] = json!(TOKEN);
    office.handle_json(&body.to_string())
}

fn advance(office: &BackOffice, number: &str, statuses: &[&str]) {
    for status in statuses {
        let response = send(
            office,
            json!({"action": "update-order-status", "orderNumber": number, "status": status}),
        );
        assert!(response.success, "{} -> {}: {}", number, status, response.message);
    }
}

#[test]
fn requests_without_a_valid_token_are_rejected() {
    let (office, _) = setup_test_env();

    let anonymous = office.handle(AdminRequest::new(AdminAction::GetOrders));
    assert!(!anonymous.success);
    assert_eq!(anonymous.status(), 401);
    assert!(anonymous.data.is_none());

    let forged = office.handle(AdminRequest::new(AdminAction::GetOrders).with_token("guess"));
    assert_eq!(forged.status(), 401);

    let allowed = office.handle(AdminRequest::new(AdminAction::GetOrders).with_token(TOKEN));
    assert!(allowed.success);
    assert_eq!(allowed.data, Some(json!([])));
}

#[test]
fn delivered_orders_show_up_in_stats() {
    let (office, _) = setup_test_env();
    place_order(&office, "ASI000001", "Chocolate Cake", 1000.0, 2);
    place_order(&office, "ASI000002", "Lemon Tart", 450.0, 1);

    advance(&office, "ASI000001", &["confirmed", "preparing", "ready", "delivered"]);
    advance(&office, "ASI000002", &["cancelled"]);

    let stats = send(&office, json!({"action": "get-stats"}));
    let data = stats.data.expect("stats payload");
    assert_eq!(data["total"], 2);
    assert_eq!(data["pending"], 0);
    assert_eq!(data["cancelled"], 1);
    assert_eq!(data["totalRevenue"], 2000.0);
}

#[test]
fn illegal_transitions_and_unknown_statuses_are_bad_requests() {
    let (office, _) = setup_test_env();
    place_order(&office, "ASI000001", "Chocolate Cake", 1000.0, 1);

    let skipped = send(
        &office,
        json!({"action": "update-order-status", "orderNumber": "ASI000001", "status": "completed"}),
    );
    assert_eq!(skipped.status(), 400);
    assert_eq!(skipped.message, "Invalid transition: pending -> completed");

    let typo = send(
        &office,
        json!({"action": "update-order-status", "orderNumber": "ASI000001", "status": "confimed"}),
    );
    assert_eq!(typo.status(), 400);
    assert!(typo.message.contains("did you mean `confirmed`?"));

    let missing = send(
        &office,
        json!({"action": "update-order-status", "orderNumber": "ASI404", "status": "confirmed"}),
    );
    assert_eq!(missing.status(), 404);
}

#[test]
fn notes_and_deletion_round_trip() {
    let (office, _) = setup_test_env();
    place_order(&office, "ASI000001", "Chocolate Cake", 1000.0, 1);

    let blank = send(
        &office,
        json!({"action": "add-order-note", "orderNumber": "ASI000001", "note": "   "}),
    );
    assert_eq!(blank.status(), 400);

    let noted = send(
        &office,
        json!({"action": "add-order-note", "orderNumber": "ASI000001", "note": " pickup at 5pm "}),
    );
    assert!(noted.success);
    assert_eq!(noted.data.expect("order")["notes"][0]["text"], "pickup at 5pm");

    assert!(send(&office, json!({"action": "delete-order", "orderNumber": "ASI000001"})).success);
    let again = send(&office, json!({"action": "delete-order", "orderNumber": "ASI000001"}));
    assert_eq!(again.status(), 404);
    assert_eq!(
        send(&office, json!({"action": "get-orders"})).data,
        Some(json!([]))
    );
}

#[test]
fn expenses_validate_and_delete() {
    let (office, _) = setup_test_env();

    let zero = send(
        &office,
        json!({"action": "add-expense", "description": "Flour", "amount": 0}),
    );
    assert_eq!(zero.status(), 400);

    let added = send(
        &office,
        json!({"action": "add-expense", "description": " Flour ", "amount": 500, "category": "Ingredients"}),
    );
    assert!(added.success, "{}", added.message);
    let expense = added.data.expect("expense");
    assert_eq!(expense["description"], "Flour");
    assert_eq!(expense["paymentMethod"], "cash");

    let listed = send(&office, json!({"action": "get-expenses"}));
    assert_eq!(listed.data.expect("expenses").as_array().map(Vec::len), Some(1));

    let id = expense["id"].clone();
    assert!(send(&office, json!({"action": "delete-expense", "id": id.clone()})).success);
    let again = send(&office, json!({"action": "delete-expense", "id": id}));
    assert_eq!(again.status(), 404);

    let garbage = send(&office, json!({"action": "delete-expense", "id": "not-a-uuid"}));
    assert_eq!(garbage.status(), 400);
}

#[test]
fn summary_tracks_budget_utilization() {
    let (office, _) = setup_test_env();
    place_order(&office, "ASI000001", "Chocolate Cake", 1000.0, 2);
    advance(&office, "ASI000001", &["confirmed", "preparing", "ready", "delivered"]);
    send(
        &office,
        json!({"action": "add-expense", "description": "Flour", "amount": 500, "category": "Ingredients"}),
    );

    let negative = send(&office, json!({"action": "save-budget", "monthlyBudget": -1}));
    assert_eq!(negative.status(), 400);
    let saved = send(
        &office,
        json!({"action": "save-budget", "monthlyBudget": 1000, "categories": {"Ingredients": 400}}),
    );
    assert!(saved.success, "{}", saved.message);

    let summary = send(&office, json!({"action": "get-financial-summary"}))
        .data
        .expect("summary");
    assert_eq!(summary["allTime"]["revenue"], 2000.0);
    assert_eq!(summary["allTime"]["profit"], 1500.0);
    assert_eq!(summary["budgetReport"]["utilization"], 50.0);
    assert_eq!(summary["budgetReport"]["tier"], "safe");
    assert_eq!(summary["budgetReport"]["categories"][0]["tier"], "overBudget");
    assert_eq!(summary["topProducts"][0]["name"], "Chocolate Cake");
    assert!(summary["health"]["score"].as_u64().is_some_and(|score| score <= 100));
}

#[test]
fn transactions_filter_and_export() {
    let (office, _) = setup_test_env();
    place_order(&office, "ASI000001", "Chocolate Cake", 1000.0, 2);
    advance(&office, "ASI000001", &["confirmed", "preparing", "ready", "delivered"]);
    send(
        &office,
        json!({
            "action": "add-expense",
            "description": "Flour, \"00\" grade",
            "amount": 500,
            "category": "Ingredients",
            "paymentMethod": "card"
        }),
    );

    let expenses = send(
        &office,
        json!({"action": "get-transactions", "type": "expense", "range": "month"}),
    )
    .data
    .expect("transactions");
    assert_eq!(expenses["stats"]["count"], 1);
    assert_eq!(expenses["stats"]["expenses"], 500.0);
    assert_eq!(expenses["transactions"][0]["category"], "Ingredients");

    let searched = send(&office, json!({"action": "get-transactions", "search": "nimali"}))
        .data
        .expect("transactions");
    assert_eq!(searched["stats"]["income"], 2000.0);
    assert_eq!(searched["transactions"][0]["orderNumber"], "ASI000001");

    let export = send(&office, json!({"action": "export-transactions"}))
        .data
        .expect("export");
    assert_eq!(export["filename"], "bakery-transactions-2026-10-19.csv");
    assert_eq!(export["rows"], 2);
    assert_snapshot!(export["csv"].as_str().expect("csv text"), @r###"
    Date,Type,Category,Description,Amount,Status,Payment Method
    "2026-10-19","income","Sales","Order #ASI000001","2000","delivered","N/A"
    "2026-10-19","expense","Ingredients","Flour, ""00"" grade","500","completed","card"
    "###);
}

#[test]
fn malformed_bodies_name_the_problem() {
    let (office, _) = setup_test_env();

    let not_json = office.handle_json("{ nope");
    assert_eq!(not_json.status(), 400);

    let unknown = send(&office, json!({"action": "get-summary"}));
    assert_eq!(unknown.status(), 400);
    assert!(unknown.message.starts_with("Malformed request: unknown action `get-summary`"));
}

#[test]
fn permissive_policy_allows_skipping_steps() {
    let (office, _) = setup_test_env();
    let office = office.with_policy(TransitionPolicy::Permissive);
    place_order(&office, "ASI000001", "Chocolate Cake", 1000.0, 1);

    advance(&office, "ASI000001", &["completed"]);
    let stats = send(&office, json!({"action": "get-stats"})).data.expect("stats");
    assert_eq!(stats["completed"], 1);
    assert_eq!(stats["totalRevenue"], 1000.0);

    let rewind = send(
        &office,
        json!({"action": "update-order-status", "orderNumber": "ASI000001", "status": "pending"}),
    );
    assert!(rewind.success);
    assert_eq!(office.config().transition_policy, TransitionPolicy::Permissive);
}

#[test]
fn expense_messages_use_the_currency_label() {
    let (office, _) = setup_test_env();
    let added = send(
        &office,
        json!({"action": "add-expense", "description": "Gas", "amount": "1250.5"}),
    );
    assert_eq!(added.message, "Expense added successfully (Rs 1250.50)");
}
