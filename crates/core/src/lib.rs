//! Chapterhouse Core - Shared types library.
//!
//! This crate provides common types used across all Chapterhouse components:
//! - `api` - Bookstore HTTP API
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, email addresses, partial-update fields, and
//!   catalog ordering

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
