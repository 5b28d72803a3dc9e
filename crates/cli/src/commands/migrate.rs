//! Database migration command.
//!
//! Migrations are embedded from `crates/api/migrations/` at compile time and
//! applied with sqlx's migrator.
//!
//! # Environment Variables
//!
//! - `BOOKSTORE_DATABASE_URL` - `PostgreSQL` connection string (falls back
//!   to `DATABASE_URL`)

use thiserror::Error;

use super::ConnectError;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending database migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the connection or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    tracing::info!("Connecting to database...");
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
