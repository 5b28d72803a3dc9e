//! Database operations for the bookstore `PostgreSQL`.
//!
//! ## Tables
//!
//! - `users` - Accounts and admin flags
//! - `auth_tokens` - Opaque bearer tokens with expiry
//! - `addresses` - User shipping addresses (single-default invariant)
//! - `genres`, `authors`, `publishers` - Catalog dictionaries
//! - `books`, `book_authors` - Catalog with a many-to-many author link
//! - `carts`, `cart_items` - One cart per user, one line per (cart, book)
//! - `orders`, `order_items` - Immutable checkout snapshots
//!
//! All queries use sqlx's runtime API; multi-step writes run inside a
//! transaction owned by the repository method that needs them.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p chapterhouse-cli -- migrate
//! ```

pub mod addresses;
pub mod books;
pub mod carts;
pub mod dicts;
pub mod orders;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::AddressRepository;
pub use books::BookRepository;
pub use carts::CartRepository;
pub use dicts::{AuthorRepository, GenreRepository, PublisherRepository};
pub use orders::OrderRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email or ISBN).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique-constraint violation to `Conflict` with the given message.
pub(crate) fn map_unique_violation(err: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(err)
}

/// Map a foreign-key violation to `NotFound` (the referenced row is gone).
pub(crate) fn map_fk_violation(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::NotFound;
    }
    RepositoryError::Database(err)
}
