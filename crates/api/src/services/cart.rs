//! Cart service.
//!
//! The cart is created lazily on first access. Item mutations always go
//! through the caller's own cart, so another user's item IDs behave exactly
//! like missing ones.

use sqlx::PgPool;

use chapterhouse_core::{BookId, CartItemId, UserId};

use crate::db::CartRepository;
use crate::error::{AppError, Result};
use crate::models::{Cart, CartItem};

/// A cart with its lines.
#[derive(Debug, Clone)]
pub struct CartWithItems {
    pub cart: Cart,
    pub items: Vec<CartItem>,
}

/// Cart service.
pub struct CartService<'a> {
    carts: CartRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            carts: CartRepository::new(pool),
        }
    }

    /// Get the user's cart, creating it on first access.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn get_cart(&self, user_id: UserId) -> Result<CartWithItems> {
        let cart = self.carts.get_or_create(user_id).await?;
        let items = self.carts.items(cart.cart_id).await?;

        Ok(CartWithItems { cart, items })
    }

    /// Add a book to the user's cart.
    ///
    /// An existing line for the same book is merged by incrementing its
    /// quantity; the cart never holds two lines for one book.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a non-positive quantity.
    /// Returns `AppError::NotFound` if the book doesn't exist.
    pub async fn add_item(
        &self,
        user_id: UserId,
        book_id: BookId,
        quantity: i32,
    ) -> Result<CartWithItems> {
        validate_quantity(quantity)?;

        let cart = self.carts.get_or_create(user_id).await?;
        self.carts
            .add_item(cart.cart_id, book_id, quantity)
            .await
            .map_err(|e| match e {
                crate::db::RepositoryError::NotFound => {
                    AppError::NotFound("Book not found".to_owned())
                }
                other => other.into(),
            })?;
        let items = self.carts.items(cart.cart_id).await?;

        Ok(CartWithItems { cart, items })
    }

    /// Set the quantity of one of the user's cart lines.
    ///
    /// Returns `None` if the user has no cart or the item isn't in it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a non-positive quantity.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        cart_item_id: CartItemId,
        quantity: i32,
    ) -> Result<Option<CartWithItems>> {
        validate_quantity(quantity)?;

        let Some(cart) = self.carts.get_by_user(user_id).await? else {
            return Ok(None);
        };

        let updated = self
            .carts
            .update_item_quantity(cart.cart_id, cart_item_id, quantity)
            .await?;
        if updated.is_none() {
            return Ok(None);
        }

        let items = self.carts.items(cart.cart_id).await?;
        Ok(Some(CartWithItems { cart, items }))
    }

    /// Remove one of the user's cart lines.
    ///
    /// # Returns
    ///
    /// Returns `true` if the item was removed, `false` if it wasn't in the
    /// user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn remove_item(&self, user_id: UserId, cart_item_id: CartItemId) -> Result<bool> {
        let Some(cart) = self.carts.get_by_user(user_id).await? else {
            return Ok(false);
        };

        Ok(self.carts.remove_item(cart.cart_id, cart_item_id).await?)
    }

    /// Remove every line from the user's cart.
    ///
    /// A user without a cart has nothing to clear; that is a success.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<()> {
        if let Some(cart) = self.carts.get_by_user(user_id).await? {
            self.carts.clear(cart.cart_id).await?;
        }

        Ok(())
    }
}

/// Cart quantities are always at least 1.
fn validate_quantity(quantity: i32) -> Result<()> {
    if quantity < 1 {
        return Err(AppError::BadRequest(
            "quantity must be at least 1".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(99).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }
}
