//! Job Records

use jiff::Timestamp;
use serde::Deserialize;
use serde_json::Value;

use crate::{domain::jobs::data::Job, uuids::TypedUuid};

/// Delayed Job UUID
pub type JobUuid = TypedUuid<DelayedJobRecord>;

/// Delayed Job Record
#[derive(Debug, Clone)]
pub struct DelayedJobRecord {
    pub uuid: JobUuid,
    pub kind: String,
    pub payload: Value,

    /// Earliest time the job may be claimed.
    pub run_at: Timestamp,

    /// Number of times the job has been claimed.
    pub attempts: u32,

    /// Lease expiry of the current claim, if any.
    pub locked_until: Option<Timestamp>,

    pub last_error: Option<String>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl DelayedJobRecord {
    /// Decode the stored payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload does not describe a known job.
    pub fn job(&self) -> Result<Job, serde_json::Error> {
        Job::deserialize(&self.payload)
    }
}
