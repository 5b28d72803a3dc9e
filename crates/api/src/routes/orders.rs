//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use chapterhouse_core::{BookId, OrderId, OrderItemId, UserId};

use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::services::orders::{OrderService, OrderWithItems};
use crate::state::AppState;

/// Public view of an order line with its frozen price.
#[derive(Debug, Serialize)]
pub struct OrderItemRead {
    pub order_item_id: OrderItemId,
    pub book_id: BookId,
    pub quantity: i32,
    pub price: Decimal,
}

/// Public view of an order.
#[derive(Debug, Serialize)]
pub struct OrderRead {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub total_amount: Decimal,
    pub status: String,
    pub items: Vec<OrderItemRead>,
}

impl From<OrderWithItems> for OrderRead {
    fn from(entry: OrderWithItems) -> Self {
        Self {
            order_id: entry.order.order_id,
            user_id: entry.order.user_id,
            created_at: entry.order.created_at,
            total_amount: entry.order.total_amount,
            status: entry.order.status,
            items: entry
                .items
                .into_iter()
                .map(|item| OrderItemRead {
                    order_item_id: item.order_item_id,
                    book_id: item.book_id,
                    quantity: item.quantity,
                    price: item.price,
                })
                .collect(),
        }
    }
}

/// POST /api/orders - Convert the cart into an order.
///
/// Fails with 400 when the cart is empty; the cart is emptied on success.
#[instrument(skip(state, user))]
pub async fn checkout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse> {
    let order = OrderService::new(state.pool()).checkout(user.user_id).await?;

    Ok((StatusCode::CREATED, Json(OrderRead::from(order))))
}

/// GET /api/orders - The caller's orders, newest first.
#[instrument(skip(state, user))]
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<OrderRead>>> {
    let orders = OrderService::new(state.pool())
        .list_for_user(user.user_id)
        .await?;

    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// GET /api/orders/{order_id} - One of the caller's orders.
#[instrument(skip(state, user))]
pub async fn get(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderRead>> {
    let order = OrderService::new(state.pool())
        .get_for_user(user.user_id, order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    Ok(Json(order.into()))
}
