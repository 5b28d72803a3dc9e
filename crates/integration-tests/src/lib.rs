//! Integration tests for Chapterhouse.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL, migrate, and start the API with a seeded admin:
//! cargo run -p chapterhouse-cli -- migrate
//! BOOKSTORE_ADMIN_EMAIL=admin@example.com \
//! BOOKSTORE_ADMIN_PASSWORD='adm1n!secret' \
//!     cargo run -p chapterhouse-api
//!
//! # Run the ignored tests against it:
//! cargo test -p chapterhouse-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `BOOKSTORE_API_URL` - Base URL of the running API
//!   (default: <http://localhost:8000>)
//! - `BOOKSTORE_ADMIN_EMAIL` / `BOOKSTORE_ADMIN_PASSWORD` - Credentials of
//!   the seeded admin account (defaults match the snippet above)

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc)]

use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use uuid::Uuid;

/// Password that satisfies the registration and complexity rules.
pub const TEST_PASSWORD: &str = "s3cret!pass";

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("BOOKSTORE_API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// Create an HTTP client.
#[must_use]
pub fn client() -> Client {
    Client::new()
}

/// Register a fresh user and log in.
///
/// Returns the user's email and bearer token.
pub async fn register_and_login(client: &Client) -> (String, String) {
    let base_url = base_url();
    let email = format!("user-{}@example.com", Uuid::new_v4().simple());

    let resp = client
        .post(format!("{base_url}/api/auth/register"))
        .json(&json!({
            "email": email,
            "password": TEST_PASSWORD,
            "full_name": "Test User",
        }))
        .send()
        .await
        .expect("Failed to register");
    assert!(
        resp.status().is_success(),
        "registration failed: {}",
        resp.status()
    );

    let token = login(client, &email, TEST_PASSWORD).await;
    (email, token)
}

/// Log in and return the bearer token.
pub async fn login(client: &Client, email: &str, password: &str) -> String {
    let base_url = base_url();

    let resp = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to login");
    assert!(resp.status().is_success(), "login failed: {}", resp.status());

    let body: Value = resp.json().await.expect("Failed to parse login response");
    body["access_token"]
        .as_str()
        .expect("missing access_token")
        .to_string()
}

/// Log in as the seeded admin account.
pub async fn admin_token(client: &Client) -> String {
    let email =
        std::env::var("BOOKSTORE_ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
    let password =
        std::env::var("BOOKSTORE_ADMIN_PASSWORD").unwrap_or_else(|_| "adm1n!secret".to_string());

    login(client, &email, &password).await
}

/// Create a book through the admin API and return the response body.
pub async fn create_book(client: &Client, token: &str, payload: &Value) -> Value {
    let base_url = base_url();

    let resp = client
        .post(format!("{base_url}/api/books"))
        .bearer_auth(token)
        .json(payload)
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(resp.status(), 201, "book creation failed");

    resp.json().await.expect("Failed to parse book response")
}

/// Read a decimal field that may be serialized as a string or a number.
#[must_use]
pub fn decimal_field(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().expect("invalid decimal string"),
        Value::Number(n) => n.to_string().parse().expect("invalid decimal number"),
        other => panic!("expected a decimal, got {other:?}"),
    }
}
