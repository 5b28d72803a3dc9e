//! Cart row types.

use chrono::{DateTime, Utc};

use chapterhouse_core::{BookId, CartId, CartItemId, UserId};

/// A user's shopping cart.
///
/// Created lazily on first access, one per user, never deleted.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Cart {
    pub cart_id: CartId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// A single cart line.
///
/// At most one row exists per `(cart_id, book_id)` pair; adding the same
/// book again increments the quantity instead.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartItem {
    pub cart_item_id: CartItemId,
    pub cart_id: CartId,
    pub book_id: BookId,
    /// Always at least 1.
    pub quantity: i32,
}
