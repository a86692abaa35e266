//! Carts service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("cart item not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CartsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
