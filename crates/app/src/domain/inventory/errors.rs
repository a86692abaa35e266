//! Inventory errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("sku not found")]
    NotFound,

    #[error("stock amounts must be positive")]
    InvalidAmount,

    #[error("stock would become negative")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for InventoryError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
