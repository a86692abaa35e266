//! Orders service errors.

use std::num::TryFromIntError;

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{
    database::is_concurrency_conflict,
    domain::{
        inventory::InventoryError, jobs::JobsError, orders::records::OrderStatus,
        products::records::SkuUuid,
    },
};

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("address not found")]
    AddressNotFound,

    #[error("sku {0} not found")]
    SkuNotFound(SkuUuid),

    #[error("insufficient stock for sku {sku}: requested {requested}, available {available}")]
    InsufficientStock {
        sku: SkuUuid,
        requested: u32,
        available: u64,
    },

    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("order is {0}")]
    InvalidStatus(OrderStatus),

    #[error("transaction conflicted with a concurrent writer")]
    ConcurrencyConflict,

    #[error("order not found")]
    NotFound,

    #[error("order already exists")]
    AlreadyExists,

    #[error("related resource not found")]
    InvalidReference,

    #[error("invalid data")]
    InvalidData,

    #[error("invalid amount")]
    InvalidAmount(#[from] TryFromIntError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if is_concurrency_conflict(&error) {
            return Self::ConcurrencyConflict;
        }

        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}

impl From<InventoryError> for OrdersServiceError {
    fn from(error: InventoryError) -> Self {
        match error {
            InventoryError::NotFound => Self::NotFound,
            InventoryError::InvalidAmount => {
                Self::InvalidInput("item amount must be positive")
            }
            InventoryError::InvalidData => Self::InvalidData,
            InventoryError::Sql(error) => Self::from(error),
        }
    }
}

/// Failures while scheduling or handling an order's expiry.
#[derive(Debug, Error)]
pub enum CancellationError {
    #[error("delay queue error")]
    Queue(#[from] JobsError),

    #[error("inventory error")]
    Inventory(#[from] InventoryError),

    #[error("transaction conflicted with a concurrent writer")]
    ConcurrencyConflict,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CancellationError {
    fn from(error: Error) -> Self {
        if is_concurrency_conflict(&error) {
            Self::ConcurrencyConflict
        } else {
            Self::Sql(error)
        }
    }
}
