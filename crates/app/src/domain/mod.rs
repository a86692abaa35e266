//! Storefront Domain Concerns

pub mod addresses;
pub mod carts;
pub mod inventory;
pub mod jobs;
pub mod orders;
pub mod products;
pub mod users;
