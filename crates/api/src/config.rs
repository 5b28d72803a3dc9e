//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BOOKSTORE_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   the generic `DATABASE_URL`)
//!
//! ## Optional
//! - `BOOKSTORE_HOST` - Bind address (default: 127.0.0.1)
//! - `BOOKSTORE_PORT` - Listen port (default: 8000)
//! - `BOOKSTORE_TOKEN_TTL_MINUTES` - Bearer token lifetime (default: 60)
//! - `BOOKSTORE_COVERS_DIR` - Directory for uploaded cover images
//!   (default: data/covers)
//! - `BOOKSTORE_ADMIN_EMAIL` / `BOOKSTORE_ADMIN_PASSWORD` - When both are
//!   set, the default admin account is seeded at startup
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Lifetime of issued bearer tokens, in minutes
    pub token_ttl_minutes: i64,
    /// Directory where uploaded book covers are stored
    pub covers_dir: PathBuf,
    /// Default admin account seeded at startup, if configured
    pub default_admin: Option<DefaultAdminConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Credentials for the idempotent default-admin seed.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct DefaultAdminConfig {
    /// Admin email address.
    pub email: String,
    /// Admin password (hashed before storage).
    pub password: SecretString,
}

impl std::fmt::Debug for DefaultAdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultAdminConfig")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("BOOKSTORE_DATABASE_URL")?;
        let host = get_env_or_default("BOOKSTORE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("BOOKSTORE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("BOOKSTORE_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("BOOKSTORE_PORT".to_string(), e.to_string()))?;
        let token_ttl_minutes = get_env_or_default("BOOKSTORE_TOKEN_TTL_MINUTES", "60")
            .parse::<i64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BOOKSTORE_TOKEN_TTL_MINUTES".to_string(), e.to_string())
            })?;
        let covers_dir = PathBuf::from(get_env_or_default("BOOKSTORE_COVERS_DIR", "data/covers"));
        let default_admin = DefaultAdminConfig::from_env();
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            token_ttl_minutes,
            covers_dir,
            default_admin,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl DefaultAdminConfig {
    /// Present only when both email and password variables are set.
    fn from_env() -> Option<Self> {
        let email = get_optional_env("BOOKSTORE_ADMIN_EMAIL")?;
        let password = get_optional_env("BOOKSTORE_ADMIN_PASSWORD")?;
        Some(Self {
            email,
            password: SecretString::from(password),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            token_ttl_minutes: 60,
            covers_dir: PathBuf::from("data/covers"),
            default_admin: None,
            sentry_dsn: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn test_default_admin_debug_redacts_password() {
        let admin = DefaultAdminConfig {
            email: "admin@example.com".to_string(),
            password: SecretString::from("super_secret_password"),
        };

        let debug_output = format!("{admin:?}");
        assert!(debug_output.contains("admin@example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_password"));
    }
}
