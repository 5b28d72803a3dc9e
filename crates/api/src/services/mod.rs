//! Business-rule services.
//!
//! Services sit between the route handlers and the repositories: they apply
//! the bookstore's rules (find-or-create resolution, cart merge, checkout,
//! the single-default address invariant) and translate repository results
//! into boundary errors. Handlers never talk SQL; repositories never decide
//! policy.

pub mod addresses;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
