//! Order repository.
//!
//! Checkout is the one multi-statement transaction that matters: order
//! header, frozen order items, and cart clearing commit together or not at
//! all. The cart row is locked `FOR UPDATE` so concurrent checkouts of the
//! same cart serialize instead of double-charging.

use rust_decimal::Decimal;
use sqlx::PgPool;

use chapterhouse_core::{BookId, CartId, DEFAULT_ORDER_STATUS, OrderId, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem};

const ORDER_COLUMNS: &str = "order_id, user_id, created_at, total_amount, status";
const ITEM_COLUMNS: &str = "order_item_id, order_id, book_id, quantity, price";

/// A cart line joined with the current book price, as read at checkout.
#[derive(Debug, Clone, sqlx::FromRow)]
struct CheckoutLine {
    book_id: BookId,
    quantity: i32,
    price: Decimal,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// List an order's items in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items
             WHERE order_id = $1
             ORDER BY order_item_id ASC"
        ))
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// List the items for a set of orders in one query.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items_for_orders(
        &self,
        ids: &[OrderId],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items
             WHERE order_id = ANY($1)
             ORDER BY order_id ASC, order_item_id ASC"
        ))
        .bind(raw)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE user_id = $1
             ORDER BY created_at DESC, order_id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// List every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, order_id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Convert a cart into an order, atomically.
    ///
    /// Inside one transaction: lock the cart row, read its lines joined with
    /// the current book prices, insert the order header with the computed
    /// total, insert one order item per line with the price frozen, and
    /// delete the cart items.
    ///
    /// Returns `None` when the cart is empty; no order row is created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails.
    pub async fn create_from_cart(
        &self,
        user_id: UserId,
        cart_id: CartId,
    ) -> Result<Option<(Order, Vec<OrderItem>)>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Serialize concurrent checkouts of the same cart
        sqlx::query("SELECT cart_id FROM carts WHERE cart_id = $1 FOR UPDATE")
            .bind(cart_id)
            .fetch_optional(&mut *tx)
            .await?;

        let lines = sqlx::query_as::<_, CheckoutLine>(
            "SELECT ci.book_id, ci.quantity, b.price
             FROM cart_items ci
             JOIN books b ON b.book_id = ci.book_id
             WHERE ci.cart_id = $1
             ORDER BY ci.cart_item_id ASC",
        )
        .bind(cart_id)
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            return Ok(None);
        }

        let total = order_total(&lines);

        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders (user_id, total_amount, status)
             VALUES ($1, $2, $3)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(total)
        .bind(DEFAULT_ORDER_STATUS)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let item = sqlx::query_as::<_, OrderItem>(&format!(
                "INSERT INTO order_items (order_id, book_id, quantity, price)
                 VALUES ($1, $2, $3, $4)
                 RETURNING {ITEM_COLUMNS}"
            ))
            .bind(order.order_id)
            .bind(line.book_id)
            .bind(line.quantity)
            .bind(line.price)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item);
        }

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some((order, items)))
    }

    /// Overwrite an order's status.
    ///
    /// Returns `None` if the order doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_status(
        &self,
        id: OrderId,
        status: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET status = $1 WHERE order_id = $2 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(status)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }
}

/// Total of a set of checkout lines: sum of unit price times quantity.
fn order_total(lines: &[CheckoutLine]) -> Decimal {
    lines
        .iter()
        .map(|line| line.price * Decimal::from(line.quantity))
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(book_id: i32, quantity: i32, price: &str) -> CheckoutLine {
        CheckoutLine {
            book_id: BookId::new(book_id),
            quantity,
            price: price.parse().unwrap(),
        }
    }

    #[test]
    fn test_order_total() {
        let lines = vec![line(1, 2, "100"), line(2, 1, "300")];
        assert_eq!(order_total(&lines), "500".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_order_total_empty() {
        assert_eq!(order_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_order_total_keeps_cents() {
        let lines = vec![line(1, 3, "19.99")];
        assert_eq!(order_total(&lines), "59.97".parse::<Decimal>().unwrap());
    }
}
