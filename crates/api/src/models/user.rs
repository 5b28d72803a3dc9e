//! User and bearer-token row types.

use chrono::{DateTime, Utc};

use chapterhouse_core::{Email, UserId};

/// A registered user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub user_id: UserId,
    /// User's email address (unique).
    pub email: Email,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Display name.
    pub full_name: String,
    /// Optional contact phone number.
    pub phone: Option<String>,
    /// Whether the user may access admin operations.
    pub is_admin: bool,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

/// An opaque bearer token issued at login.
///
/// Tokens are looked up verbatim; expired rows are ignored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthToken {
    /// The token value presented in the `Authorization` header.
    pub token: String,
    /// User the token authenticates.
    pub user_id: UserId,
    /// When the token was issued.
    pub created_at: DateTime<Utc>,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}
