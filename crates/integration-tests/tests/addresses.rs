//! Integration tests for the single-default address invariant.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running
//!
//! Run with: cargo test -p chapterhouse-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use chapterhouse_integration_tests::{base_url, client, register_and_login};

async fn create_address(client: &Client, token: &str, city: &str, is_default: bool) -> Value {
    let base_url = base_url();
    let resp = client
        .post(format!("{base_url}/api/users/me/addresses"))
        .bearer_auth(token)
        .json(&json!({
            "city": city,
            "street": "Main Street",
            "house": "1",
            "postal_code": "12345",
            "is_default": is_default,
        }))
        .send()
        .await
        .expect("Failed to create address");
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.expect("Failed to parse address")
}

async fn list_addresses(client: &Client, token: &str) -> Vec<Value> {
    let base_url = base_url();
    let resp = client
        .get(format!("{base_url}/api/users/me/addresses"))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to list addresses");
    let body: Value = resp.json().await.expect("Failed to parse list");
    body.as_array().expect("expected array").clone()
}

fn default_count(addresses: &[Value]) -> usize {
    addresses
        .iter()
        .filter(|a| a["is_default"].as_bool() == Some(true))
        .count()
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_first_address_becomes_default() {
    let client = client();
    let (_, token) = register_and_login(&client).await;

    let address = create_address(&client, &token, "Lisbon", false).await;
    assert_eq!(address["is_default"].as_bool(), Some(true));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_requested_default_moves_the_flag() {
    let client = client();
    let (_, token) = register_and_login(&client).await;

    create_address(&client, &token, "Lisbon", false).await;
    let second = create_address(&client, &token, "Porto", true).await;

    let addresses = list_addresses(&client, &token).await;
    assert_eq!(default_count(&addresses), 1);
    let default = addresses
        .iter()
        .find(|a| a["is_default"].as_bool() == Some(true))
        .unwrap();
    assert_eq!(default["address_id"], second["address_id"]);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_unset_on_only_address_is_discarded() {
    let client = client();
    let base_url = base_url();
    let (_, token) = register_and_login(&client).await;

    let only = create_address(&client, &token, "Lisbon", true).await;
    let address_id = only["address_id"].as_i64().unwrap();

    let resp = client
        .put(format!("{base_url}/api/users/me/addresses/{address_id}"))
        .bearer_auth(&token)
        .json(&json!({ "is_default": false }))
        .send()
        .await
        .expect("Failed to update");
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();

    // The flag change is silently dropped: the invariant wins
    assert_eq!(updated["is_default"].as_bool(), Some(true));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_deleting_default_promotes_oldest_remaining() {
    let client = client();
    let base_url = base_url();
    let (_, token) = register_and_login(&client).await;

    let first = create_address(&client, &token, "Lisbon", false).await;
    let second = create_address(&client, &token, "Porto", false).await;
    let third = create_address(&client, &token, "Braga", true).await;

    let third_id = third["address_id"].as_i64().unwrap();
    let resp = client
        .delete(format!("{base_url}/api/users/me/addresses/{third_id}"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to delete");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let addresses = list_addresses(&client, &token).await;
    assert_eq!(addresses.len(), 2);
    assert_eq!(default_count(&addresses), 1);
    let default = addresses
        .iter()
        .find(|a| a["is_default"].as_bool() == Some(true))
        .unwrap();
    assert_eq!(default["address_id"], first["address_id"]);
    assert_ne!(default["address_id"], second["address_id"]);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_invariant_holds_across_mixed_operations() {
    let client = client();
    let base_url = base_url();
    let (_, token) = register_and_login(&client).await;

    let a = create_address(&client, &token, "Lisbon", false).await;
    let addresses = list_addresses(&client, &token).await;
    assert_eq!(default_count(&addresses), 1);

    let b = create_address(&client, &token, "Porto", true).await;
    let addresses = list_addresses(&client, &token).await;
    assert_eq!(default_count(&addresses), 1);

    // Promote the first back via update
    let a_id = a["address_id"].as_i64().unwrap();
    client
        .put(format!("{base_url}/api/users/me/addresses/{a_id}"))
        .bearer_auth(&token)
        .json(&json!({ "is_default": true }))
        .send()
        .await
        .expect("Failed to update");
    let addresses = list_addresses(&client, &token).await;
    assert_eq!(default_count(&addresses), 1);

    // Delete the non-default; the default is untouched
    let b_id = b["address_id"].as_i64().unwrap();
    client
        .delete(format!("{base_url}/api/users/me/addresses/{b_id}"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to delete");
    let addresses = list_addresses(&client, &token).await;
    assert_eq!(addresses.len(), 1);
    assert_eq!(default_count(&addresses), 1);
    assert_eq!(addresses[0]["address_id"].as_i64(), Some(a_id));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_addresses_isolated_between_users() {
    let client = client();
    let base_url = base_url();
    let (_, owner) = register_and_login(&client).await;
    let (_, intruder) = register_and_login(&client).await;

    let address = create_address(&client, &owner, "Lisbon", true).await;
    let address_id = address["address_id"].as_i64().unwrap();

    let resp = client
        .put(format!("{base_url}/api/users/me/addresses/{address_id}"))
        .bearer_auth(&intruder)
        .json(&json!({ "city": "Hijacked" }))
        .send()
        .await
        .expect("Failed to send");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .delete(format!("{base_url}/api/users/me/addresses/{address_id}"))
        .bearer_auth(&intruder)
        .send()
        .await
        .expect("Failed to send");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
