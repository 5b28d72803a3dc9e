//! Admin user management command.
//!
//! Delegates to the API's idempotent seeding step, so `admin create` can be
//! re-run safely: a missing account is created, an existing one promoted.

use thiserror::Error;

use chapterhouse_api::bootstrap::{BootstrapError, ensure_default_admin};

use super::ConnectError;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Seeding error: {0}")]
    Bootstrap(#[from] BootstrapError),
}

/// Create or promote an admin user.
///
/// # Errors
///
/// Returns `AdminError` if the connection or the seeding step fails.
pub async fn create_user(email: &str, password: &str) -> Result<(), AdminError> {
    let pool = super::connect().await?;

    ensure_default_admin(&pool, email, password).await?;

    tracing::info!("Admin user ready: {email}");
    Ok(())
}
