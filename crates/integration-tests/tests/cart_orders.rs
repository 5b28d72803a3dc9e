//! Integration tests for cart and checkout behavior.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running with a seeded admin account
//!
//! Run with: cargo test -p chapterhouse-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use chapterhouse_integration_tests::{
    admin_token, base_url, client, create_book, decimal_field, register_and_login,
};

async fn sample_book(price: &str) -> Value {
    let client = client();
    let token = admin_token(&client).await;
    create_book(
        &client,
        &token,
        &json!({
            "title": format!("Cart test book ({price})"),
            "price": price,
        }),
    )
    .await
}

// ============================================================================
// Cart merge
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_add_same_book_twice_merges_quantities() {
    let client = client();
    let base_url = base_url();
    let (_, token) = register_and_login(&client).await;
    let book = sample_book("10.00").await;
    let book_id = book["book_id"].as_i64().unwrap();

    for qty in [2, 3] {
        let resp = client
            .post(format!("{base_url}/api/cart/items"))
            .bearer_auth(&token)
            .json(&json!({ "book_id": book_id, "quantity": qty }))
            .send()
            .await
            .expect("Failed to add item");
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = client
        .get(format!("{base_url}/api/cart"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get cart");
    let cart: Value = resp.json().await.unwrap();

    let items = cart["items"].as_array().unwrap();
    let lines: Vec<&Value> = items
        .iter()
        .filter(|i| i["book_id"].as_i64() == Some(book_id))
        .collect();
    assert_eq!(lines.len(), 1, "expected a single merged line");
    assert_eq!(lines[0]["quantity"].as_i64(), Some(5));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_zero_quantity_rejected() {
    let client = client();
    let base_url = base_url();
    let (_, token) = register_and_login(&client).await;
    let book = sample_book("10.00").await;

    let resp = client
        .post(format!("{base_url}/api/cart/items"))
        .bearer_auth(&token)
        .json(&json!({ "book_id": book["book_id"], "quantity": 0 }))
        .send()
        .await
        .expect("Failed to send");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_checkout_totals_and_clears_cart() {
    let client = client();
    let base_url = base_url();
    let (_, token) = register_and_login(&client).await;

    let cheap = sample_book("100.00").await;
    let pricey = sample_book("300.00").await;

    for (book, qty) in [(&cheap, 2), (&pricey, 1)] {
        let resp = client
            .post(format!("{base_url}/api/cart/items"))
            .bearer_auth(&token)
            .json(&json!({ "book_id": book["book_id"], "quantity": qty }))
            .send()
            .await
            .expect("Failed to add item");
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = client
        .post(format!("{base_url}/api/orders"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to checkout");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.unwrap();

    assert_eq!(decimal_field(&order["total_amount"]), "500".parse().unwrap());
    assert_eq!(order["status"].as_str(), Some("created"));
    assert_eq!(order["items"].as_array().unwrap().len(), 2);

    // The cart must be empty afterwards
    let resp = client
        .get(format!("{base_url}/api/cart"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get cart");
    let cart: Value = resp.json().await.unwrap();
    assert!(cart["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_checkout_freezes_prices() {
    let client = client();
    let base_url = base_url();
    let admin = admin_token(&client).await;
    let (_, token) = register_and_login(&client).await;

    let book = sample_book("50.00").await;
    let book_id = book["book_id"].as_i64().unwrap();

    client
        .post(format!("{base_url}/api/cart/items"))
        .bearer_auth(&token)
        .json(&json!({ "book_id": book_id, "quantity": 1 }))
        .send()
        .await
        .expect("Failed to add item");

    let resp = client
        .post(format!("{base_url}/api/orders"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to checkout");
    let order: Value = resp.json().await.unwrap();

    // Later catalog price changes must not touch the order snapshot
    let resp = client
        .put(format!("{base_url}/api/books/{book_id}"))
        .bearer_auth(&admin)
        .json(&json!({ "price": "99.00" }))
        .send()
        .await
        .expect("Failed to update price");
    assert!(resp.status().is_success());

    let order_id = order["order_id"].as_i64().unwrap();
    let resp = client
        .get(format!("{base_url}/api/orders/{order_id}"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to fetch order");
    let fetched: Value = resp.json().await.unwrap();

    let item = &fetched["items"].as_array().unwrap()[0];
    assert_eq!(decimal_field(&item["price"]), "50.00".parse().unwrap());
    assert_eq!(
        decimal_field(&fetched["total_amount"]),
        "50.00".parse().unwrap()
    );
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_checkout_with_empty_cart_rejected() {
    let client = client();
    let base_url = base_url();
    let (_, token) = register_and_login(&client).await;

    let resp = client
        .post(format!("{base_url}/api/orders"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to checkout");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // No order may have been created
    let resp = client
        .get(format!("{base_url}/api/orders"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to list orders");
    let orders: Value = resp.json().await.unwrap();
    assert!(orders.as_array().unwrap().is_empty());
}

// ============================================================================
// Ownership isolation
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_cart_items_isolated_between_users() {
    let client = client();
    let base_url = base_url();
    let (_, owner) = register_and_login(&client).await;
    let (_, intruder) = register_and_login(&client).await;

    let book = sample_book("10.00").await;
    let resp = client
        .post(format!("{base_url}/api/cart/items"))
        .bearer_auth(&owner)
        .json(&json!({ "book_id": book["book_id"], "quantity": 1 }))
        .send()
        .await
        .expect("Failed to add item");
    let cart: Value = resp.json().await.unwrap();
    let item_id = cart["items"].as_array().unwrap()[0]["cart_item_id"]
        .as_i64()
        .unwrap();

    // Another user's mutation attempts answer 404, never touching the item
    let resp = client
        .patch(format!("{base_url}/api/cart/items/{item_id}"))
        .bearer_auth(&intruder)
        .json(&json!({ "quantity": 42 }))
        .send()
        .await
        .expect("Failed to send");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .delete(format!("{base_url}/api/cart/items/{item_id}"))
        .bearer_auth(&intruder)
        .send()
        .await
        .expect("Failed to send");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .get(format!("{base_url}/api/cart"))
        .bearer_auth(&owner)
        .send()
        .await
        .expect("Failed to get cart");
    let cart: Value = resp.json().await.unwrap();
    assert_eq!(cart["items"].as_array().unwrap()[0]["quantity"].as_i64(), Some(1));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_orders_isolated_between_users() {
    let client = client();
    let base_url = base_url();
    let (_, owner) = register_and_login(&client).await;
    let (_, intruder) = register_and_login(&client).await;

    let book = sample_book("10.00").await;
    client
        .post(format!("{base_url}/api/cart/items"))
        .bearer_auth(&owner)
        .json(&json!({ "book_id": book["book_id"], "quantity": 1 }))
        .send()
        .await
        .expect("Failed to add item");
    let resp = client
        .post(format!("{base_url}/api/orders"))
        .bearer_auth(&owner)
        .send()
        .await
        .expect("Failed to checkout");
    let order: Value = resp.json().await.unwrap();
    let order_id = order["order_id"].as_i64().unwrap();

    let resp = client
        .get(format!("{base_url}/api/orders/{order_id}"))
        .bearer_auth(&intruder)
        .send()
        .await
        .expect("Failed to send");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
