//! Cart route handlers.
//!
//! All endpoints operate on the calling user's own cart; item IDs from other
//! users' carts answer 404.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use chapterhouse_core::{BookId, CartId, CartItemId};

use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::services::cart::{CartService, CartWithItems};
use crate::state::AppState;

/// Add-to-cart payload.
#[derive(Debug, Deserialize)]
pub struct CartItemCreateRequest {
    pub book_id: BookId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

/// Quantity update payload.
#[derive(Debug, Deserialize)]
pub struct CartItemUpdateRequest {
    pub quantity: i32,
}

/// Public view of a cart line.
#[derive(Debug, Serialize)]
pub struct CartItemRead {
    pub cart_item_id: CartItemId,
    pub book_id: BookId,
    pub quantity: i32,
}

/// Public view of a cart.
#[derive(Debug, Serialize)]
pub struct CartRead {
    pub cart_id: CartId,
    pub items: Vec<CartItemRead>,
}

impl From<CartWithItems> for CartRead {
    fn from(cart: CartWithItems) -> Self {
        Self {
            cart_id: cart.cart.cart_id,
            items: cart
                .items
                .into_iter()
                .map(|item| CartItemRead {
                    cart_item_id: item.cart_item_id,
                    book_id: item.book_id,
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

/// GET /api/cart - Current cart, created lazily on first access.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<CartRead>> {
    let cart = CartService::new(state.pool()).get_cart(user.user_id).await?;
    Ok(Json(cart.into()))
}

/// POST /api/cart/items - Add a book, merging with an existing line.
#[instrument(skip(state, user))]
pub async fn add_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CartItemCreateRequest>,
) -> Result<impl IntoResponse> {
    let cart = CartService::new(state.pool())
        .add_item(user.user_id, payload.book_id, payload.quantity)
        .await?;

    Ok((StatusCode::CREATED, Json(CartRead::from(cart))))
}

/// PATCH /api/cart/items/{item_id} - Set a line's quantity.
#[instrument(skip(state, user))]
pub async fn update_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(item_id): Path<CartItemId>,
    Json(payload): Json<CartItemUpdateRequest>,
) -> Result<Json<CartRead>> {
    let cart = CartService::new(state.pool())
        .set_quantity(user.user_id, item_id, payload.quantity)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart item not found".to_owned()))?;

    Ok(Json(cart.into()))
}

/// DELETE /api/cart/items/{item_id} - Remove a line.
#[instrument(skip(state, user))]
pub async fn remove_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(item_id): Path<CartItemId>,
) -> Result<StatusCode> {
    let removed = CartService::new(state.pool())
        .remove_item(user.user_id, item_id)
        .await?;
    if !removed {
        return Err(AppError::NotFound("Cart item not found".to_owned()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/cart - Remove every line.
#[instrument(skip(state, user))]
pub async fn clear(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode> {
    CartService::new(state.pool()).clear(user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
