//! Catalog seeding command.
//!
//! Inserts a small sample catalog through the same service path the API
//! uses, so genre/publisher/author names go through find-or-create exactly
//! like admin-created books do. Skips seeding when any book already exists.

use rust_decimal::Decimal;
use thiserror::Error;

use chapterhouse_api::db::books::BookFilter;
use chapterhouse_api::error::AppError;
use chapterhouse_api::services::catalog::{BookInput, CatalogService};

use super::ConnectError;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Seeding error: {0}")]
    App(#[from] AppError),
}

/// Seed the catalog with sample books.
///
/// # Errors
///
/// Returns `SeedError` if the connection or an insert fails.
pub async fn catalog() -> Result<(), SeedError> {
    let pool = super::connect().await?;
    let catalog = CatalogService::new(&pool);

    let probe = BookFilter {
        limit: 1,
        ..BookFilter::default()
    };
    if !catalog.list_books(&probe).await?.is_empty() {
        tracing::info!("Catalog already contains books, skipping seed");
        return Ok(());
    }

    let samples = sample_books();
    let count = samples.len();
    for sample in samples {
        catalog.create_book(sample).await?;
    }

    tracing::info!("Seeded {count} sample books");
    Ok(())
}

fn price(value: &str) -> Decimal {
    value.parse().unwrap_or(Decimal::ZERO)
}

fn sample_books() -> Vec<BookInput> {
    let book = |title: &str,
                price_str: &str,
                year: i32,
                pages: i32,
                genre: &str,
                publisher: &str,
                authors: &[&str]| BookInput {
        title: title.to_owned(),
        description: None,
        price: price(price_str),
        publication_year: Some(year),
        pages: Some(pages),
        isbn: None,
        cover_image: None,
        genre_id: None,
        genre_name: Some(genre.to_owned()),
        publisher_id: None,
        publisher_name: Some(publisher.to_owned()),
        author_ids: Vec::new(),
        author_names: authors.iter().map(|&a| a.to_owned()).collect(),
    };

    vec![
        book(
            "The Left Hand of Darkness",
            "14.99",
            1969,
            304,
            "Science Fiction",
            "Ace Books",
            &["Ursula K. Le Guin"],
        ),
        book(
            "The Name of the Rose",
            "18.50",
            1980,
            512,
            "Historical Fiction",
            "Bompiani",
            &["Umberto Eco"],
        ),
        book(
            "Good Omens",
            "12.00",
            1990,
            416,
            "Fantasy",
            "Gollancz",
            &["Terry Pratchett", "Neil Gaiman"],
        ),
        book(
            "The Master and Margarita",
            "11.25",
            1967,
            384,
            "Classics",
            "YMCA Press",
            &["Mikhail Bulgakov"],
        ),
        book(
            "Annihilation",
            "13.75",
            2014,
            208,
            "Science Fiction",
            "FSG Originals",
            &["Jeff VanderMeer"],
        ),
    ]
}
