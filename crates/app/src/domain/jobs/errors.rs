//! Delay queue errors.

use std::num::TryFromIntError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobsError {
    #[error("job not found")]
    NotFound,

    #[error("delay or lease out of range")]
    InvalidDuration(#[from] TryFromIntError),

    #[error("failed to encode job payload")]
    Payload(#[from] serde_json::Error),

    #[error("storage error")]
    Sql(#[source] sqlx::Error),
}

impl From<sqlx::Error> for JobsError {
    fn from(error: sqlx::Error) -> Self {
        if matches!(error, sqlx::Error::RowNotFound) {
            return Self::NotFound;
        }

        Self::Sql(error)
    }
}
