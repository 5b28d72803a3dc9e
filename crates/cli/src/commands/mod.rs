//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use thiserror::Error;

/// Errors shared by commands that need a database connection.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect to the bookstore database using the API's pool settings.
///
/// Reads `BOOKSTORE_DATABASE_URL` with a fallback to `DATABASE_URL`.
pub(crate) async fn connect() -> Result<sqlx::PgPool, ConnectError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("BOOKSTORE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| ConnectError::MissingEnvVar("BOOKSTORE_DATABASE_URL"))?;

    let pool = chapterhouse_api::db::create_pool(&SecretString::from(database_url)).await?;
    Ok(pool)
}
