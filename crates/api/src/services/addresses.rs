//! Address service.
//!
//! Field validation lives here; the single-default invariant itself is
//! enforced transactionally by the repository.

use sqlx::PgPool;

use chapterhouse_core::{AddressId, UserId};

use crate::db::AddressRepository;
use crate::db::addresses::{AddressPatch, NewAddress};
use crate::error::{AppError, Result};
use crate::models::Address;

/// Address service.
pub struct AddressService<'a> {
    addresses: AddressRepository<'a>,
}

impl<'a> AddressService<'a> {
    /// Create a new address service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            addresses: AddressRepository::new(pool),
        }
    }

    /// List the user's addresses, default first.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Address>> {
        Ok(self.addresses.list_by_user(user_id).await?)
    }

    /// Create an address for the user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for out-of-range field lengths.
    pub async fn create(&self, user_id: UserId, input: NewAddress) -> Result<Address> {
        validate_field("city", &input.city, 2, 255)?;
        validate_field("street", &input.street, 2, 255)?;
        validate_field("house", &input.house, 1, 50)?;
        validate_field("postal_code", &input.postal_code, 3, 20)?;

        Ok(self.addresses.create(user_id, &input).await?)
    }

    /// Apply a partial update to one of the user's addresses.
    ///
    /// Returns `None` if the address doesn't exist or isn't the user's.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for out-of-range field lengths.
    pub async fn update(
        &self,
        user_id: UserId,
        address_id: AddressId,
        patch: AddressPatch,
    ) -> Result<Option<Address>> {
        if let Some(city) = &patch.city {
            validate_field("city", city, 2, 255)?;
        }
        if let Some(street) = &patch.street {
            validate_field("street", street, 2, 255)?;
        }
        if let Some(house) = &patch.house {
            validate_field("house", house, 1, 50)?;
        }
        if let Some(postal_code) = &patch.postal_code {
            validate_field("postal_code", postal_code, 3, 20)?;
        }

        Ok(self.addresses.update(user_id, address_id, &patch).await?)
    }

    /// Delete one of the user's addresses.
    ///
    /// # Returns
    ///
    /// Returns `true` if the address was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn delete(&self, user_id: UserId, address_id: AddressId) -> Result<bool> {
        Ok(self.addresses.delete(user_id, address_id).await?)
    }
}

/// Address fields carry simple length bounds.
fn validate_field(name: &str, value: &str, min: usize, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(AppError::BadRequest(format!(
            "{name} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_field_bounds() {
        assert!(validate_field("city", "Riga", 2, 255).is_ok());
        assert!(validate_field("city", "R", 2, 255).is_err());
        assert!(validate_field("house", "1", 1, 50).is_ok());
        assert!(validate_field("postal_code", "LV", 3, 20).is_err());
        assert!(validate_field("house", &"9".repeat(51), 1, 50).is_err());
    }
}
