//! User repository for database operations.
//!
//! Covers accounts, profile updates, and the bearer tokens issued at login.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use chapterhouse_core::{Email, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::{AuthToken, User};

const USER_COLUMNS: &str =
    "user_id, email, password_hash, full_name, phone, is_admin, created_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
        full_name: &str,
        phone: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, full_name, phone, is_admin)
             VALUES ($1, $2, $3, $4, FALSE)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .bind(phone)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "user with this email already exists"))?;

        Ok(user)
    }

    /// Update a user's profile fields.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is taken by another user.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_profile(
        &self,
        id: UserId,
        email: &Email,
        full_name: &str,
        phone: Option<&str>,
    ) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET email = $1, full_name = $2, phone = $3
             WHERE user_id = $4
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(full_name)
        .bind(phone)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "user with this email already exists"))?;

        Ok(user)
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE user_id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Set or clear a user's admin flag.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_admin(
        &self,
        id: UserId,
        is_admin: bool,
    ) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET is_admin = $1 WHERE user_id = $2 RETURNING {USER_COLUMNS}"
        ))
        .bind(is_admin)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// List all users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, user_id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    // =========================================================================
    // Bearer tokens
    // =========================================================================

    /// Store a freshly issued bearer token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_token(
        &self,
        user_id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<AuthToken, RepositoryError> {
        let row = sqlx::query_as::<_, AuthToken>(
            "INSERT INTO auth_tokens (token, user_id, expires_at)
             VALUES ($1, $2, $3)
             RETURNING token, user_id, created_at, expires_at",
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Resolve a bearer token to its user.
    ///
    /// Expired tokens resolve to `None`; there is no background reaper.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_token(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT u.user_id, u.email, u.password_hash, u.full_name, u.phone,
                    u.is_admin, u.created_at
             FROM auth_tokens t
             JOIN users u ON u.user_id = t.user_id
             WHERE t.token = $1 AND t.expires_at > NOW()",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }
}
