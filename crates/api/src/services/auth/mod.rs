//! Authentication service.
//!
//! Registration, login, and password changes. Passwords are hashed with
//! Argon2id; logins issue opaque UUID bearer tokens stored server-side with
//! an expiry.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use chapterhouse_core::Email;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length for registration.
const MIN_PASSWORD_LENGTH: usize = 8;

/// A bearer token issued at login.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Opaque token value for the `Authorization: Bearer` header.
    pub token: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with email and password.
    ///
    /// Registration never creates admins; the admin flag is only granted
    /// through seeding or an existing admin.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        phone: Option<&str>,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&email, &password_hash, full_name, phone)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password, issuing a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        ttl_minutes: i64,
    ) -> Result<(User, IssuedToken), AuthError> {
        let email = Email::parse(email)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + Duration::minutes(ttl_minutes);
        let stored = self
            .users
            .create_token(user.user_id, &token, expires_at)
            .await?;

        Ok((
            user,
            IssuedToken {
                token: stored.token,
                expires_at: stored.expires_at,
            },
        ))
    }

    /// Change a user's password after verifying the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the current password is wrong.
    /// Returns `AuthError::WeakPassword` if the new password fails the
    /// complexity rule.
    pub async fn change_password(
        &self,
        user: &User,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        verify_password(current_password, &user.password_hash)?;
        validate_password_complexity(new_password)?;

        let password_hash = hash_password(new_password)?;
        self.users
            .set_password_hash(user.user_id, &password_hash)
            .await?;

        Ok(())
    }
}

/// New passwords must be at least 8 characters and mix letters, digits,
/// and at least one special character.
fn validate_password_complexity(password: &str) -> Result<(), AuthError> {
    let has_length = password.len() >= MIN_PASSWORD_LENGTH;
    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());

    if has_length && has_letter && has_digit && has_special {
        Ok(())
    } else {
        Err(AuthError::WeakPassword(
            "password must be at least 8 characters and contain letters, digits, \
             and a special character"
                .to_owned(),
        ))
    }
}

/// Hash a password using Argon2id.
pub(crate) fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complexity_accepts_mixed_password() {
        assert!(validate_password_complexity("s3cret!pass").is_ok());
    }

    #[test]
    fn test_complexity_rejects_short() {
        assert!(matches!(
            validate_password_complexity("a1!b"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_complexity_rejects_missing_digit() {
        assert!(validate_password_complexity("password!!").is_err());
    }

    #[test]
    fn test_complexity_rejects_missing_letter() {
        assert!(validate_password_complexity("12345678!").is_err());
    }

    #[test]
    fn test_complexity_rejects_missing_special() {
        assert!(validate_password_complexity("password123").is_err());
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("s3cret!pass").expect("hash");
        assert!(verify_password("s3cret!pass", &hash).is_ok());
        assert!(verify_password("wrong", &hash).is_err());
    }
}
