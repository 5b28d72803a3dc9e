//! Integration tests for authentication and profile management.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running
//!
//! Run with: cargo test -p chapterhouse-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use chapterhouse_integration_tests::{
    TEST_PASSWORD, base_url, client, login, register_and_login,
};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_login_me_roundtrip() {
    let client = client();
    let base_url = base_url();
    let (email, token) = register_and_login(&client).await;

    let resp = client
        .get(format!("{base_url}/api/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get me");
    assert_eq!(resp.status(), StatusCode::OK);
    let me: Value = resp.json().await.unwrap();

    assert_eq!(me["email"].as_str(), Some(email.as_str()));
    assert_eq!(me["is_admin"].as_bool(), Some(false));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_duplicate_email_rejected() {
    let client = client();
    let base_url = base_url();
    let (email, _) = register_and_login(&client).await;

    let resp = client
        .post(format!("{base_url}/api/auth/register"))
        .json(&json!({
            "email": email,
            "password": TEST_PASSWORD,
            "full_name": "Copycat",
        }))
        .send()
        .await
        .expect("Failed to send");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_wrong_password_rejected() {
    let client = client();
    let base_url = base_url();
    let (email, _) = register_and_login(&client).await;

    let resp = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({ "email": email, "password": "wrong-password-1!" }))
        .send()
        .await
        .expect("Failed to send");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_requests_without_token_rejected() {
    let client = client();
    let base_url = base_url();

    for path in ["/api/cart", "/api/orders", "/api/users/me"] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Failed to send");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "path: {path}");
    }
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_profile_update_and_email_conflict() {
    let client = client();
    let base_url = base_url();
    let (taken_email, _) = register_and_login(&client).await;
    let (_, token) = register_and_login(&client).await;

    // Update to a fresh email works
    let fresh = format!("renamed-{}@example.com", Uuid::new_v4().simple());
    let resp = client
        .put(format!("{base_url}/api/users/me"))
        .bearer_auth(&token)
        .json(&json!({ "email": fresh, "full_name": "Renamed User", "phone": "+1555" }))
        .send()
        .await
        .expect("Failed to update profile");
    assert_eq!(resp.status(), StatusCode::OK);
    let profile: Value = resp.json().await.unwrap();
    assert_eq!(profile["email"].as_str(), Some(fresh.as_str()));
    assert_eq!(profile["phone"].as_str(), Some("+1555"));

    // Stealing another user's email is rejected
    let resp = client
        .put(format!("{base_url}/api/users/me"))
        .bearer_auth(&token)
        .json(&json!({ "email": taken_email, "full_name": "Renamed User" }))
        .send()
        .await
        .expect("Failed to send");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_password_change_flow() {
    let client = client();
    let base_url = base_url();
    let (email, token) = register_and_login(&client).await;

    // Wrong current password
    let resp = client
        .post(format!("{base_url}/api/users/me/password"))
        .bearer_auth(&token)
        .json(&json!({ "current_password": "nope", "new_password": "n3w!secret" }))
        .send()
        .await
        .expect("Failed to send");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // New password failing the complexity rule
    let resp = client
        .post(format!("{base_url}/api/users/me/password"))
        .bearer_auth(&token)
        .json(&json!({ "current_password": TEST_PASSWORD, "new_password": "letters" }))
        .send()
        .await
        .expect("Failed to send");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Valid change, then login with the new password
    let resp = client
        .post(format!("{base_url}/api/users/me/password"))
        .bearer_auth(&token)
        .json(&json!({ "current_password": TEST_PASSWORD, "new_password": "n3w!secret" }))
        .send()
        .await
        .expect("Failed to send");
    assert_eq!(resp.status(), StatusCode::OK);

    login(&client, &email, "n3w!secret").await;
}
