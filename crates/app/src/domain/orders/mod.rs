//! Orders
//!
//! Order placement, lookup and the pending → paid / closed lifecycle.

pub mod cancellation;
pub mod data;
pub mod errors;
pub mod records;
pub(crate) mod repositories;
pub mod service;

pub use cancellation::*;
pub use errors::{CancellationError, OrdersServiceError};
pub use service::*;
