//! Storefront ordering core: catalog, carts, stock reservation, order
//! placement and delayed order expiry on `PostgreSQL`.

pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod observability;
pub mod shutdown;
pub mod worker;

#[cfg(test)]
mod test;

mod uuids;

pub use uuids::TypedUuid;
