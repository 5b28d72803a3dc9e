//! Integration tests for catalog filtering and find-or-create resolution.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running with a seeded admin account
//!
//! Run with: cargo test -p chapterhouse-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use chapterhouse_integration_tests::{admin_token, base_url, client, create_book, decimal_field};

// ============================================================================
// Find-or-create
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_same_genre_name_resolves_to_one_genre() {
    let client = client();
    let token = admin_token(&client).await;
    let genre_name = format!("Genre {}", Uuid::new_v4().simple());

    let first = create_book(
        &client,
        &token,
        &json!({ "title": "First", "price": "10.00", "genre_name": genre_name }),
    )
    .await;
    let second = create_book(
        &client,
        &token,
        &json!({ "title": "Second", "price": "12.00", "genre_name": genre_name }),
    )
    .await;

    let first_genre = first["genre_id"].as_i64().expect("first book has genre");
    let second_genre = second["genre_id"].as_i64().expect("second book has genre");
    assert_eq!(first_genre, second_genre, "both books share one genre row");

    // Exactly one genre with that name exists
    let base_url = base_url();
    let resp = client
        .get(format!("{base_url}/api/dicts/genres"))
        .send()
        .await
        .expect("Failed to list genres");
    let genres: Value = resp.json().await.unwrap();
    let matching = genres
        .as_array()
        .unwrap()
        .iter()
        .filter(|g| g["name"].as_str() == Some(genre_name.as_str()))
        .count();
    assert_eq!(matching, 1);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_author_names_resolve_and_replace() {
    let client = client();
    let base_url = base_url();
    let token = admin_token(&client).await;
    let author = format!("Author {}", Uuid::new_v4().simple());

    let book = create_book(
        &client,
        &token,
        &json!({ "title": "Authored", "price": "10.00", "author_names": [author] }),
    )
    .await;
    let ids = book["author_ids"].as_array().unwrap();
    assert_eq!(ids.len(), 1);

    // Replacing with an empty explicit list clears the set
    let book_id = book["book_id"].as_i64().unwrap();
    let resp = client
        .put(format!("{base_url}/api/books/{book_id}"))
        .bearer_auth(&token)
        .json(&json!({ "author_ids": [] }))
        .send()
        .await
        .expect("Failed to update");
    let updated: Value = resp.json().await.unwrap();
    assert!(updated["author_ids"].as_array().unwrap().is_empty());
}

// ============================================================================
// Filters and sorting
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_price_filter_composes_with_sort() {
    let client = client();
    let base_url = base_url();
    let token = admin_token(&client).await;
    // Unique title marker so the assertions ignore unrelated catalog rows
    let marker = Uuid::new_v4().simple().to_string();

    create_book(
        &client,
        &token,
        &json!({
            "title": format!("A {marker}"),
            "price": "100.00",
            "publication_year": 2020,
        }),
    )
    .await;
    create_book(
        &client,
        &token,
        &json!({
            "title": format!("B {marker}"),
            "price": "300.00",
            "publication_year": 2022,
        }),
    )
    .await;

    let resp = client
        .get(format!(
            "{base_url}/api/books?q={marker}&min_price=200&order_by=price_desc"
        ))
        .send()
        .await
        .expect("Failed to list books");
    assert_eq!(resp.status(), StatusCode::OK);
    let books: Value = resp.json().await.unwrap();
    let books = books.as_array().unwrap();

    assert_eq!(books.len(), 1);
    assert_eq!(
        books[0]["title"].as_str(),
        Some(format!("B {marker}").as_str())
    );
    assert_eq!(decimal_field(&books[0]["price"]), "300.00".parse().unwrap());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_title_search_is_case_insensitive() {
    let client = client();
    let base_url = base_url();
    let token = admin_token(&client).await;
    let marker = Uuid::new_v4().simple().to_string();

    create_book(
        &client,
        &token,
        &json!({ "title": format!("WUTHERING {marker}"), "price": "9.00" }),
    )
    .await;

    let needle = format!("wuthering {marker}").to_lowercase();
    let resp = client
        .get(format!("{base_url}/api/books?q={needle}"))
        .send()
        .await
        .expect("Failed to list books");
    let books: Value = resp.json().await.unwrap();
    assert_eq!(books.as_array().unwrap().len(), 1);
}

// ============================================================================
// Partial updates
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_null_clears_reference_absent_keeps_it() {
    let client = client();
    let base_url = base_url();
    let token = admin_token(&client).await;
    let genre_name = format!("Genre {}", Uuid::new_v4().simple());

    let book = create_book(
        &client,
        &token,
        &json!({ "title": "Patched", "price": "10.00", "genre_name": genre_name }),
    )
    .await;
    let book_id = book["book_id"].as_i64().unwrap();
    assert!(book["genre_id"].is_i64());

    // A patch that doesn't mention genre_id keeps the reference
    let resp = client
        .put(format!("{base_url}/api/books/{book_id}"))
        .bearer_auth(&token)
        .json(&json!({ "title": "Patched twice" }))
        .send()
        .await
        .expect("Failed to update");
    let updated: Value = resp.json().await.unwrap();
    assert!(updated["genre_id"].is_i64());

    // An explicit null clears it
    let resp = client
        .put(format!("{base_url}/api/books/{book_id}"))
        .bearer_auth(&token)
        .json(&json!({ "genre_id": null }))
        .send()
        .await
        .expect("Failed to update");
    let updated: Value = resp.json().await.unwrap();
    assert!(updated["genre_id"].is_null());
}

// ============================================================================
// Authorization
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_book_creation_requires_admin() {
    let client = client();
    let base_url = base_url();
    let (_, token) = chapterhouse_integration_tests::register_and_login(&client).await;

    let resp = client
        .post(format!("{base_url}/api/books"))
        .bearer_auth(&token)
        .json(&json!({ "title": "Nope", "price": "1.00" }))
        .send()
        .await
        .expect("Failed to send");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_negative_price_rejected() {
    let client = client();
    let base_url = base_url();
    let token = admin_token(&client).await;

    let resp = client
        .post(format!("{base_url}/api/books"))
        .bearer_auth(&token)
        .json(&json!({ "title": "Cheap", "price": "-1.00" }))
        .send()
        .await
        .expect("Failed to send");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
