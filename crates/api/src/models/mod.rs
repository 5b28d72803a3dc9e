//! Database row types for the bookstore.
//!
//! These structs map one-to-one onto table rows and are produced by the
//! repositories in [`crate::db`]. Serialization into API response shapes
//! happens in the route layer.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod user;

pub use address::Address;
pub use cart::{Cart, CartItem};
pub use catalog::{Author, Book, Genre, Publisher};
pub use order::{Order, OrderItem};
pub use user::{AuthToken, User};
