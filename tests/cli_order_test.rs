//! Integration tests for order and customer commands.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_order_list_seeded() {
    let env = TestEnv::init();
    let list = env.json(&["order", "list"]);
    assert_eq!(list["count"], 3);
    assert_eq!(list["orders"][0]["id"], "order-1");
    assert_eq!(list["orders"][0]["customerId"], "customer-1");
    assert_eq!(list["orders"][0]["totalAmount"], 229.97);
    assert_eq!(list["orders"][0]["status"], "delivered");
}

#[test]
fn test_order_list_filters() {
    let env = TestEnv::init();
    let shipped = env.json(&["order", "list", "--status", "shipped"]);
    assert_eq!(shipped["count"], 1);
    assert_eq!(shipped["orders"][0]["id"], "order-2");

    let by_name = env.json(&["order", "list", "-q", "ROBERT"]);
    assert_eq!(by_name["count"], 1);
    assert_eq!(by_name["orders"][0]["id"], "order-3");

    let both = env.json(&["order", "list", "-s", "delivered", "-q", "jane"]);
    assert_eq!(both["count"], 0);

    env.shop()
        .args(["order", "list", "--status", "lost"])
        .assert()
        .failure();
}

#[test]
fn test_order_show_and_update() {
    let env = TestEnv::init();
    let order = env.json(&["order", "show", "order-3"]);
    assert_eq!(order["items"].as_array().unwrap().len(), 2);
    assert_eq!(order["shippingDetails"]["city"], "Chicago");

    let updated = env.json(&["order", "update", "order-3", "--status", "shipped"]);
    assert_eq!(updated["status"], "shipped");
    assert_eq!(updated["paymentStatus"], "paid");
    assert_ne!(updated["updatedAt"], order["updatedAt"]);

    let refunded = env.json(&["order", "update", "order-3", "-p", "refunded"]);
    assert_eq!(refunded["paymentStatus"], "refunded");
    assert_eq!(refunded["status"], "shipped");
}

#[test]
fn test_order_update_errors() {
    let env = TestEnv::init();
    env.shop()
        .args(["order", "update", "order-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No fields to update"));

    env.shop()
        .args(["order", "update", "order-99", "-s", "cancelled"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Order order-99"));
}

#[test]
fn test_order_delete() {
    let env = TestEnv::init();
    env.json(&["order", "delete", "order-2"]);
    assert_eq!(env.json(&["order", "list"])["count"], 2);

    env.shop()
        .args(["order", "delete", "order-2"])
        .assert()
        .failure();
}

#[test]
fn test_order_show_human() {
    let env = TestEnv::init();
    env.shop()
        .args(["-H", "order", "show", "order-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Order order-1"))
        .stdout(predicate::str::contains("2 x Camera Lens Filter @ $49.99"))
        .stdout(predicate::str::contains("Total:    $229.97"));
}

// === Customers ===

#[test]
fn test_customer_list_and_search() {
    let env = TestEnv::init();
    let list = env.json(&["customer", "list"]);
    assert_eq!(list["count"], 3);

    let found = env.json(&["customer", "search", "los angeles"]);
    assert_eq!(found["count"], 1);
    assert_eq!(found["customers"][0]["fullName"], "Jane Smith");
}

#[test]
fn test_customer_summary() {
    let env = TestEnv::init();
    let summary = env.json(&["customer", "summary", "customer-2"]);
    assert_eq!(summary["customer"]["email"], "jane.smith@example.com");
    assert_eq!(summary["orders"].as_array().unwrap().len(), 1);
    assert_eq!(summary["total_spent"], 899.99);
    assert_eq!(summary["average_order_value"], 899.99);
}

#[test]
fn test_customer_summary_skips_deleted_orders() {
    let env = TestEnv::init();
    env.json(&["order", "delete", "order-1"]);
    let summary = env.json(&["customer", "summary", "customer-1"]);
    assert_eq!(summary["orders"].as_array().unwrap().len(), 0);
    assert_eq!(summary["total_spent"], 0.0);
}

#[test]
fn test_customer_add_update_delete() {
    let env = TestEnv::init();
    let added = env.json(&[
        "customer",
        "add",
        "--name",
        "Ada Lovelace",
        "--email",
        "ada@example.com",
        "--city",
        "London",
    ]);
    let id = added["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("customer-"));
    assert_eq!(added["orders"], serde_json::json!([]));

    let updated = env.json(&["customer", "update", &id, "--phone", "+44 20 7946 0000"]);
    assert_eq!(updated["phone"], "+44 20 7946 0000");
    assert_eq!(updated["city"], "London");

    env.json(&["customer", "delete", &id]);
    assert_eq!(env.json(&["customer", "list"])["count"], 3);
}

#[test]
fn test_customer_add_requires_name_and_email() {
    let env = TestEnv::init();
    env.shop()
        .args(["customer", "add", "--name", "Nobody", "--email", " "])
        .assert()
        .failure();
}

#[test]
fn test_customer_delete_removes_orders() {
    let env = TestEnv::init();
    env.json(&["customer", "delete", "customer-3"]);

    let orders = env.json(&["order", "list"]);
    assert_eq!(orders["count"], 2);
    assert!(
        orders["orders"]
            .as_array()
            .unwrap()
            .iter()
            .all(|o| o["customerId"] != "customer-3")
    );

    env.shop()
        .args(["customer", "show", "customer-3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Customer customer-3"));
}
