//! Products service errors.

use std::num::TryFromIntError;

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductsServiceError {
    #[error("product already exists")]
    AlreadyExists,

    #[error("product not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("invalid price or stock value")]
    InvalidAmount(#[from] TryFromIntError),
}

impl From<Error> for ProductsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            ProductsServiceError::from(Error::RowNotFound),
            ProductsServiceError::NotFound
        ));
    }

    #[test]
    fn price_above_bigint_range_is_rejected() {
        let result = i64::try_from(u64::MAX).map_err(ProductsServiceError::from);

        assert!(matches!(result, Err(ProductsServiceError::InvalidAmount(_))));
    }
}
