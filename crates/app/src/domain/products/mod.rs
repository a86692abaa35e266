//! Products
//!
//! The catalog: products and their purchasable SKUs.

pub mod data;
pub mod errors;
pub mod records;
pub(crate) mod repository;
pub mod service;

pub use errors::ProductsServiceError;
pub use service::*;
