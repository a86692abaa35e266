//! Carts
//!
//! A user's cart is the set of their `(user, sku)` lines; there is no separate
//! cart row.

pub mod data;
pub mod errors;
pub mod records;
pub(crate) mod repository;
pub mod service;

pub use errors::CartsServiceError;
pub use service::*;
