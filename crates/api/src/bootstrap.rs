//! Startup seeding.
//!
//! The default admin account is created by an explicit, idempotent seeding
//! step invoked once at process initialization (and reusable from the CLI),
//! not by ambient module-level code.

use sqlx::PgPool;
use thiserror::Error;

use chapterhouse_core::{Email, EmailError};

use crate::db::{RepositoryError, UserRepository};
use crate::services::auth::{AuthError, hash_password};

/// Errors that can occur during startup seeding.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("invalid admin email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Ensure an admin account with the given credentials exists.
///
/// - Missing user: created with the supplied password and promoted to admin.
/// - Existing non-admin: promoted to admin, password left untouched.
/// - Existing admin: no-op.
///
/// Safe to run on every startup.
///
/// # Errors
///
/// Returns `BootstrapError` if the email is invalid or a query fails.
pub async fn ensure_default_admin(
    pool: &PgPool,
    email: &str,
    password: &str,
) -> Result<(), BootstrapError> {
    let email = Email::parse(email)?;
    let users = UserRepository::new(pool);

    match users.get_by_email(&email).await? {
        Some(user) if user.is_admin => {
            tracing::debug!(%email, "Default admin already present");
        }
        Some(user) => {
            users.set_admin(user.user_id, true).await?;
            tracing::info!(%email, "Promoted existing user to admin");
        }
        None => {
            let password_hash = hash_password(password)?;
            let user = users
                .create(&email, &password_hash, "Administrator", None)
                .await?;
            users.set_admin(user.user_id, true).await?;
            tracing::info!(%email, "Created default admin account");
        }
    }

    Ok(())
}
