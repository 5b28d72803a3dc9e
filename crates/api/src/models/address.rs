//! Address row type.

use chrono::{DateTime, Utc};

use chapterhouse_core::{AddressId, UserId};

/// A user's shipping address.
///
/// At most one address per user carries `is_default = true`; the repository
/// maintains that invariant across create/update/delete.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Address {
    /// Unique address ID.
    pub address_id: AddressId,
    /// Owning user.
    pub user_id: UserId,
    pub city: String,
    pub street: String,
    pub house: String,
    pub postal_code: String,
    /// Whether this is the user's default shipping address.
    pub is_default: bool,
    /// When the address was created (drives default promotion order).
    pub created_at: DateTime<Utc>,
}
