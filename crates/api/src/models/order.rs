//! Order row types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use chapterhouse_core::{BookId, OrderId, OrderItemId, UserId};

/// An order created from a cart at checkout.
///
/// Orders are immutable snapshots apart from the free-form `status` string,
/// which admins may transition to arbitrary values.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    /// Sum of item price x quantity, computed at checkout time.
    pub total_amount: Decimal,
    pub status: String,
}

/// A single order line.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItem {
    pub order_item_id: OrderItemId,
    pub order_id: OrderId,
    pub book_id: BookId,
    pub quantity: i32,
    /// Unit price copied from the book at checkout; immune to later
    /// catalog price changes.
    pub price: Decimal,
}
