//! Address repository.
//!
//! All writes maintain the single-default invariant: whenever a user has at
//! least one address, exactly one of them carries `is_default = true`. The
//! decision logic lives in the pure helpers at the bottom of this file; the
//! repository methods apply those decisions inside one transaction each.

use sqlx::PgPool;

use chapterhouse_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::Address;

const ADDRESS_COLUMNS: &str =
    "address_id, user_id, city, street, house, postal_code, is_default, created_at";

/// Input for creating an address.
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub city: String,
    pub street: String,
    pub house: String,
    pub postal_code: String,
    /// Caller's request; the first address becomes default regardless.
    pub is_default: bool,
}

/// Partial update of an address. `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct AddressPatch {
    pub city: Option<String>,
    pub street: Option<String>,
    pub house: Option<String>,
    pub postal_code: Option<String>,
    pub is_default: Option<bool>,
}

/// What to do with the default flag on an address update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DefaultTransition {
    /// Keep the flag as it is.
    Unchanged,
    /// Make this address the default, un-defaulting the others.
    Promote,
    /// Drop the flag here and promote the first other address.
    Demote,
    /// The requested unset would leave zero defaults; discard it silently.
    Discard,
}

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's addresses, default first, then by creation order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let addresses = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses
             WHERE user_id = $1
             ORDER BY is_default DESC, address_id ASC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(addresses)
    }

    /// Get one of a user's addresses.
    ///
    /// Another user's address behaves exactly like a missing one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses
             WHERE user_id = $1 AND address_id = $2"
        ))
        .bind(user_id)
        .bind(address_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(address)
    }

    /// Create an address for a user.
    ///
    /// The new address becomes default when requested, or unconditionally
    /// when it is the user's first address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails.
    pub async fn create(
        &self,
        user_id: UserId,
        input: &NewAddress,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM addresses WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;

        let is_default = default_on_create(input.is_default, existing);
        if is_default {
            sqlx::query(
                "UPDATE addresses SET is_default = FALSE WHERE user_id = $1 AND is_default",
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        let address = sqlx::query_as::<_, Address>(&format!(
            "INSERT INTO addresses (user_id, city, street, house, postal_code, is_default)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&input.city)
        .bind(&input.street)
        .bind(&input.house)
        .bind(&input.postal_code)
        .bind(is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(address)
    }

    /// Apply a partial update to one of a user's addresses.
    ///
    /// Returns `None` if the address doesn't exist or belongs to someone else.
    /// Unsetting the default flag on the user's only address is discarded
    /// silently; unsetting it while other addresses exist promotes the first
    /// of them instead, so the invariant holds after every update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails.
    pub async fn update(
        &self,
        user_id: UserId,
        address_id: AddressId,
        patch: &AddressPatch,
    ) -> Result<Option<Address>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses
             WHERE user_id = $1 AND address_id = $2
             FOR UPDATE"
        ))
        .bind(user_id)
        .bind(address_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            return Ok(None);
        };

        let others: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM addresses WHERE user_id = $1 AND address_id <> $2",
        )
        .bind(user_id)
        .bind(address_id)
        .fetch_one(&mut *tx)
        .await?;

        let is_default = match default_transition(patch.is_default, current.is_default, others) {
            DefaultTransition::Promote => {
                sqlx::query(
                    "UPDATE addresses SET is_default = FALSE WHERE user_id = $1 AND is_default",
                )
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
                true
            }
            DefaultTransition::Demote => {
                promote_first_other(&mut tx, user_id, address_id).await?;
                false
            }
            DefaultTransition::Unchanged | DefaultTransition::Discard => current.is_default,
        };

        let updated = sqlx::query_as::<_, Address>(&format!(
            "UPDATE addresses
             SET city = $1, street = $2, house = $3, postal_code = $4, is_default = $5
             WHERE address_id = $6
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(patch.city.as_deref().unwrap_or(&current.city))
        .bind(patch.street.as_deref().unwrap_or(&current.street))
        .bind(patch.house.as_deref().unwrap_or(&current.house))
        .bind(patch.postal_code.as_deref().unwrap_or(&current.postal_code))
        .bind(is_default)
        .bind(address_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(updated))
    }

    /// Delete one of a user's addresses.
    ///
    /// If the deleted address was the default and others remain, the first
    /// remaining address (by creation order) is promoted.
    ///
    /// # Returns
    ///
    /// Returns `true` if the address was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails.
    pub async fn delete(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let was_default: Option<bool> = sqlx::query_scalar(
            "DELETE FROM addresses WHERE user_id = $1 AND address_id = $2 RETURNING is_default",
        )
        .bind(user_id)
        .bind(address_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(was_default) = was_default else {
            return Ok(false);
        };

        if was_default {
            promote_first_other(&mut tx, user_id, address_id).await?;
        }

        tx.commit().await?;

        Ok(true)
    }
}

/// Promote the user's first address other than `except` to default.
///
/// No-op when the user has no other address.
async fn promote_first_other(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: UserId,
    except: AddressId,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "UPDATE addresses SET is_default = TRUE
         WHERE address_id = (
             SELECT address_id FROM addresses
             WHERE user_id = $1 AND address_id <> $2
             ORDER BY address_id ASC
             LIMIT 1
         )",
    )
    .bind(user_id)
    .bind(except)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// A new address is default when requested, or when it is the first one.
const fn default_on_create(requested: bool, existing: i64) -> bool {
    requested || existing == 0
}

/// Decide how the default flag changes on update.
fn default_transition(
    requested: Option<bool>,
    currently_default: bool,
    other_count: i64,
) -> DefaultTransition {
    match requested {
        Some(true) if !currently_default => DefaultTransition::Promote,
        Some(false) if currently_default => {
            if other_count == 0 {
                DefaultTransition::Discard
            } else {
                DefaultTransition::Demote
            }
        }
        _ => DefaultTransition::Unchanged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_address_is_always_default() {
        assert!(default_on_create(false, 0));
        assert!(default_on_create(true, 0));
    }

    #[test]
    fn test_later_address_default_only_on_request() {
        assert!(!default_on_create(false, 2));
        assert!(default_on_create(true, 2));
    }

    #[test]
    fn test_transition_promote() {
        assert_eq!(
            default_transition(Some(true), false, 3),
            DefaultTransition::Promote
        );
    }

    #[test]
    fn test_transition_promote_is_noop_when_already_default() {
        assert_eq!(
            default_transition(Some(true), true, 3),
            DefaultTransition::Unchanged
        );
    }

    #[test]
    fn test_transition_unset_with_others_demotes() {
        assert_eq!(
            default_transition(Some(false), true, 1),
            DefaultTransition::Demote
        );
    }

    #[test]
    fn test_transition_unset_last_default_is_discarded() {
        assert_eq!(
            default_transition(Some(false), true, 0),
            DefaultTransition::Discard
        );
    }

    #[test]
    fn test_transition_absent_flag_keeps_current() {
        assert_eq!(
            default_transition(None, true, 2),
            DefaultTransition::Unchanged
        );
        assert_eq!(
            default_transition(None, false, 2),
            DefaultTransition::Unchanged
        );
    }

    #[test]
    fn test_transition_unset_on_non_default_is_noop() {
        assert_eq!(
            default_transition(Some(false), false, 2),
            DefaultTransition::Unchanged
        );
    }
}
