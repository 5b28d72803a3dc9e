//! Authentication extractors.
//!
//! Handlers take [`CurrentUser`] or [`RequireAdmin`] as an argument; the
//! extractor resolves the `Authorization: Bearer <token>` header against the
//! stored tokens before any handler logic runs. Downstream code only ever
//! sees a verified identity and authorizes against it - it never
//! authenticates.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// Extractor that requires a logged-in user.
///
/// Rejects with 401 when the token is missing, unknown, or expired.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.full_name)
/// }
/// ```
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_owned()))?;

        let user = UserRepository::new(state.pool())
            .get_by_token(token)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_owned()))?;

        Ok(Self(user))
    }
}

/// Extractor that requires an admin user.
///
/// Rejects with 401 when not authenticated, 403 when the user is no admin.
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_admin {
            return Err(AppError::Forbidden("Not enough permissions".to_owned()));
        }

        Ok(Self(user))
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(value).expect("header value"),
        );
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        let headers = headers_with("Bearer abc-123");
        assert_eq!(bearer_token(&headers), Some("abc-123"));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_wrong_scheme() {
        let headers = headers_with("Basic dXNlcjpwYXNz");
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_empty_token() {
        let headers = headers_with("Bearer ");
        assert_eq!(bearer_token(&headers), None);
    }
}
