//! Application configuration
//!
//! Each concern is a clap `Args` group with environment fallbacks; binaries
//! flatten the groups they need into their own command definitions.

pub mod db;
pub mod logging;
pub mod orders;
pub mod worker;

pub use db::DatabaseConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use orders::OrdersConfig;
pub use worker::WorkerConfig;
