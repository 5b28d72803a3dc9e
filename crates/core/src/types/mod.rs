//! Core types for Chapterhouse.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod order;
pub mod patch;

pub use email::{Email, EmailError};
pub use id::*;
pub use order::{BookOrder, DEFAULT_ORDER_STATUS};
pub use patch::Patch;
