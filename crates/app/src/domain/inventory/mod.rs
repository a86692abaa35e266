//! Inventory
//!
//! Stock counts per SKU. Every change goes through a single conditional
//! `UPDATE`, so concurrent reservations are serialized by the row lock and
//! stock can never go negative.

pub mod errors;
pub(crate) mod ledger;
pub mod service;

pub use errors::InventoryError;
pub use ledger::Reservation;
pub use service::*;
