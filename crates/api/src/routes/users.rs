//! Profile and address route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use chapterhouse_core::{AddressId, Email, UserId};

use crate::db::UserRepository;
use crate::db::addresses::{AddressPatch, NewAddress};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{Address, User};
use crate::services::addresses::AddressService;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Public view of a user.
#[derive(Debug, Serialize)]
pub struct UserRead {
    pub user_id: UserId,
    pub email: Email,
    pub full_name: String,
    pub phone: Option<String>,
    pub is_admin: bool,
}

impl From<User> for UserRead {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            is_admin: user.is_admin,
        }
    }
}

/// Public view of an address.
#[derive(Debug, Serialize)]
pub struct AddressRead {
    pub address_id: AddressId,
    pub city: String,
    pub street: String,
    pub house: String,
    pub postal_code: String,
    pub is_default: bool,
}

impl From<Address> for AddressRead {
    fn from(address: Address) -> Self {
        Self {
            address_id: address.address_id,
            city: address.city,
            street: address.street,
            house: address.house,
            postal_code: address.postal_code,
            is_default: address.is_default,
        }
    }
}

/// Profile response: user plus addresses.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: UserRead,
    pub addresses: Vec<AddressRead>,
}

/// Profile update payload.
#[derive(Debug, Deserialize)]
pub struct UserUpdateRequest {
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
}

/// Password change payload.
#[derive(Debug, Deserialize)]
pub struct PasswordUpdateRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Address creation payload.
#[derive(Debug, Deserialize)]
pub struct AddressCreateRequest {
    pub city: String,
    pub street: String,
    pub house: String,
    pub postal_code: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Address update payload; any subset of fields.
#[derive(Debug, Deserialize, Default)]
pub struct AddressUpdateRequest {
    pub city: Option<String>,
    pub street: Option<String>,
    pub house: Option<String>,
    pub postal_code: Option<String>,
    pub is_default: Option<bool>,
}

async fn load_profile(state: &AppState, user: User) -> Result<UserProfile> {
    let addresses = AddressService::new(state.pool()).list(user.user_id).await?;

    Ok(UserProfile {
        user: user.into(),
        addresses: addresses.into_iter().map(Into::into).collect(),
    })
}

/// GET /api/users/me - Profile with addresses.
#[instrument(skip(state, user))]
pub async fn profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<UserProfile>> {
    let profile = load_profile(&state, user).await?;
    Ok(Json(profile))
}

/// PUT /api/users/me - Update email, name, and phone.
///
/// Rejects an email already used by another account.
#[instrument(skip(state, user, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UserUpdateRequest>,
) -> Result<Json<UserProfile>> {
    let email = Email::parse(&payload.email)
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;
    if payload.full_name.trim().chars().count() < 2 {
        return Err(AppError::BadRequest(
            "full_name must be at least 2 characters".to_owned(),
        ));
    }

    let users = UserRepository::new(state.pool());
    if let Some(existing) = users.get_by_email(&email).await?
        && existing.user_id != user.user_id
    {
        return Err(AppError::BadRequest(
            "user with this email already exists".to_owned(),
        ));
    }

    let updated = users
        .update_profile(
            user.user_id,
            &email,
            payload.full_name.trim(),
            payload.phone.as_deref(),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

    let profile = load_profile(&state, updated).await?;
    Ok(Json(profile))
}

/// POST /api/users/me/password - Change password.
#[instrument(skip(state, user, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<PasswordUpdateRequest>,
) -> Result<Json<serde_json::Value>> {
    AuthService::new(state.pool())
        .change_password(&user, &payload.current_password, &payload.new_password)
        .await
        .map_err(|e| match e {
            AuthError::InvalidCredentials => {
                AppError::BadRequest("Current password is incorrect".to_owned())
            }
            other => other.into(),
        })?;

    Ok(Json(json!({ "detail": "Password updated" })))
}

/// GET /api/users/me/addresses - List addresses, default first.
#[instrument(skip(state, user))]
pub async fn list_addresses(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<AddressRead>>> {
    let addresses = AddressService::new(state.pool()).list(user.user_id).await?;
    Ok(Json(addresses.into_iter().map(Into::into).collect()))
}

/// POST /api/users/me/addresses - Create an address.
///
/// The first address always becomes the default.
#[instrument(skip(state, user, payload))]
pub async fn create_address(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<AddressCreateRequest>,
) -> Result<impl IntoResponse> {
    let address = AddressService::new(state.pool())
        .create(
            user.user_id,
            NewAddress {
                city: payload.city,
                street: payload.street,
                house: payload.house,
                postal_code: payload.postal_code,
                is_default: payload.is_default,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(AddressRead::from(address))))
}

/// PUT /api/users/me/addresses/{address_id} - Update an address.
#[instrument(skip(state, user, payload))]
pub async fn update_address(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(address_id): Path<AddressId>,
    Json(payload): Json<AddressUpdateRequest>,
) -> Result<Json<AddressRead>> {
    let patch = AddressPatch {
        city: payload.city,
        street: payload.street,
        house: payload.house,
        postal_code: payload.postal_code,
        is_default: payload.is_default,
    };

    let address = AddressService::new(state.pool())
        .update(user.user_id, address_id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Address not found".to_owned()))?;

    Ok(Json(address.into()))
}

/// DELETE /api/users/me/addresses/{address_id} - Delete an address.
///
/// Deleting the default promotes the oldest remaining address.
#[instrument(skip(state, user))]
pub async fn delete_address(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(address_id): Path<AddressId>,
) -> Result<StatusCode> {
    let deleted = AddressService::new(state.pool())
        .delete(user.user_id, address_id)
        .await?;
    if !deleted {
        return Err(AppError::NotFound("Address not found".to_owned()));
    }

    Ok(StatusCode::NO_CONTENT)
}
