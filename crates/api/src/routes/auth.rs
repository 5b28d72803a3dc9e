//! Authentication route handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::routes::users::UserRead;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Registration payload.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
}

/// Login payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued bearer token.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// POST /api/auth/register - Create an account.
///
/// Registration never grants the admin flag.
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<UserRead>> {
    let user = AuthService::new(state.pool())
        .register(
            &payload.email,
            &payload.password,
            &payload.full_name,
            payload.phone.as_deref(),
        )
        .await?;

    Ok(Json(user.into()))
}

/// POST /api/auth/login - Issue a bearer token.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let ttl = state.config().token_ttl_minutes;
    let (_, issued) = AuthService::new(state.pool())
        .login(&payload.email, &payload.password, ttl)
        .await?;

    Ok(Json(TokenResponse {
        access_token: issued.token,
        token_type: "bearer",
    }))
}

/// GET /api/auth/me - Current user.
#[instrument(skip(user))]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserRead> {
    Json(user.into())
}
