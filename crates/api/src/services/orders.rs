//! Order service: checkout and order queries.

use std::collections::HashMap;

use sqlx::PgPool;

use chapterhouse_core::{OrderId, UserId};

use crate::db::{CartRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::models::{Order, OrderItem};

/// An order with its frozen lines.
#[derive(Debug, Clone)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Order service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    carts: CartRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            carts: CartRepository::new(pool),
        }
    }

    /// Convert the user's cart into an order.
    ///
    /// The whole step is one transaction: total computed from current book
    /// prices, order header and frozen items inserted, cart emptied. A user
    /// without a cart, or with an empty one, gets `AppError::EmptyCart` and
    /// no order row.
    ///
    /// # Errors
    ///
    /// Returns `AppError::EmptyCart` when there is nothing to check out.
    pub async fn checkout(&self, user_id: UserId) -> Result<OrderWithItems> {
        let Some(cart) = self.carts.get_by_user(user_id).await? else {
            return Err(AppError::EmptyCart);
        };

        let created = self
            .orders
            .create_from_cart(user_id, cart.cart_id)
            .await?
            .ok_or(AppError::EmptyCart)?;

        let (order, items) = created;
        Ok(OrderWithItems { order, items })
    }

    /// List the user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<OrderWithItems>> {
        let orders = self.orders.list_by_user(user_id).await?;
        self.attach_items(orders).await
    }

    /// Get one of the user's orders.
    ///
    /// Another user's order behaves exactly like a missing one.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Option<OrderWithItems>> {
        let Some(order) = self.orders.get(order_id).await? else {
            return Ok(None);
        };
        if order.user_id != user_id {
            return Ok(None);
        }

        let items = self.orders.items(order_id).await?;
        Ok(Some(OrderWithItems { order, items }))
    }

    /// List every order, newest first (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn list_all(&self) -> Result<Vec<OrderWithItems>> {
        let orders = self.orders.list_all().await?;
        self.attach_items(orders).await
    }

    /// Get any order by ID (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn get(&self, order_id: OrderId) -> Result<Option<OrderWithItems>> {
        let Some(order) = self.orders.get(order_id).await? else {
            return Ok(None);
        };
        let items = self.orders.items(order_id).await?;

        Ok(Some(OrderWithItems { order, items }))
    }

    /// Overwrite an order's status (admin).
    ///
    /// Status is a free-form string; no state machine is enforced.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn set_status(
        &self,
        order_id: OrderId,
        status: &str,
    ) -> Result<Option<OrderWithItems>> {
        let Some(order) = self.orders.set_status(order_id, status).await? else {
            return Ok(None);
        };
        let items = self.orders.items(order_id).await?;

        Ok(Some(OrderWithItems { order, items }))
    }

    /// Load the items for a batch of orders with a single query.
    async fn attach_items(&self, orders: Vec<Order>) -> Result<Vec<OrderWithItems>> {
        let ids: Vec<OrderId> = orders.iter().map(|o| o.order_id).collect();

        let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for item in self.orders.items_for_orders(&ids).await? {
            by_order.entry(item.order_id).or_default().push(item);
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let items = by_order.remove(&order.order_id).unwrap_or_default();
                OrderWithItems { order, items }
            })
            .collect())
    }
}
