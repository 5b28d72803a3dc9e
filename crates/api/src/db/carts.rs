//! Cart repository.
//!
//! One cart per user, created lazily and never deleted. The merge-on-add
//! rule (at most one line per (cart, book)) is enforced by a unique index
//! and an `ON CONFLICT` upsert, so concurrent adds cannot produce duplicate
//! lines.

use sqlx::PgPool;

use chapterhouse_core::{BookId, CartId, CartItemId, UserId};

use super::{RepositoryError, map_fk_violation};
use crate::models::{Cart, CartItem};

const ITEM_COLUMNS: &str = "cart_item_id, cart_id, book_id, quantity";

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user's cart without creating one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let cart = sqlx::query_as::<_, Cart>(
            "SELECT cart_id, user_id, created_at FROM carts WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(cart)
    }

    /// Get a user's cart, creating it on first access.
    ///
    /// The no-op `DO UPDATE` makes the statement return the existing row
    /// when two requests race to create the same cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let cart = sqlx::query_as::<_, Cart>(
            "INSERT INTO carts (user_id) VALUES ($1)
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
             RETURNING cart_id, user_id, created_at",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(cart)
    }

    /// List a cart's items in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, cart_id: CartId) -> Result<Vec<CartItem>, RepositoryError> {
        let items = sqlx::query_as::<_, CartItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM cart_items
             WHERE cart_id = $1
             ORDER BY cart_item_id ASC"
        ))
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Add a book to a cart, merging with an existing line.
    ///
    /// If the cart already holds this book, the quantity is incremented;
    /// otherwise a new line is inserted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the book doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_item(
        &self,
        cart_id: CartId,
        book_id: BookId,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        let item = sqlx::query_as::<_, CartItem>(&format!(
            "INSERT INTO cart_items (cart_id, book_id, quantity)
             VALUES ($1, $2, $3)
             ON CONFLICT (cart_id, book_id)
             DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(cart_id)
        .bind(book_id)
        .bind(quantity)
        .fetch_one(self.pool)
        .await
        .map_err(map_fk_violation)?;

        Ok(item)
    }

    /// Set the quantity of a cart line.
    ///
    /// The `cart_id` predicate doubles as the ownership check: an item in
    /// another user's cart behaves exactly like a missing one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_item_quantity(
        &self,
        cart_id: CartId,
        cart_item_id: CartItemId,
        quantity: i32,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let item = sqlx::query_as::<_, CartItem>(&format!(
            "UPDATE cart_items SET quantity = $1
             WHERE cart_item_id = $2 AND cart_id = $3
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(quantity)
        .bind(cart_item_id)
        .bind(cart_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(item)
    }

    /// Remove a line from a cart.
    ///
    /// # Returns
    ///
    /// Returns `true` if the item was deleted, `false` if it didn't exist
    /// in this cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_item(
        &self,
        cart_id: CartId,
        cart_item_id: CartItemId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_item_id = $1 AND cart_id = $2")
            .bind(cart_item_id)
            .bind(cart_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove every line from a cart in one statement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
