//! Delayed Jobs
//!
//! A Postgres-backed delay queue. Claimed jobs carry a lease; a job whose
//! worker dies before acknowledging it becomes claimable again once the lease
//! runs out, so every job is delivered at least once and handlers must be
//! idempotent.

pub mod data;
pub mod errors;
pub mod queue;
pub mod records;

pub use data::Job;
pub use errors::JobsError;
pub use queue::*;
