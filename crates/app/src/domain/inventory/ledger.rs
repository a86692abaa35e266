//! Inventory Ledger

use sqlx::{Postgres, Transaction, query_scalar};
use tracing::debug;

use crate::domain::{inventory::errors::InventoryError, products::records::SkuUuid};

const DECREASE_STOCK_SQL: &str = include_str!("sql/decrease_stock.sql");
const INCREASE_STOCK_SQL: &str = include_str!("sql/increase_stock.sql");
const GET_STOCK_SQL: &str = include_str!("sql/get_stock.sql");

/// Result of a conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// Stock was decremented; `remaining` is the new level.
    Reserved { remaining: u64 },

    /// The decrement would have gone below zero and nothing was written.
    Insufficient { available: u64 },
}

impl Reservation {
    pub fn is_reserved(self) -> bool {
        matches!(self, Self::Reserved { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgInventoryLedger;

impl PgInventoryLedger {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Decrement stock by `amount` if, and only if, enough is available.
    ///
    /// The check and the write are one statement; the follow-up read only
    /// runs after a rejected write, to tell a missing SKU from a short one.
    #[tracing::instrument(
        name = "inventory.ledger.try_decrease",
        skip(self, tx),
        fields(sku_uuid = %sku),
        err
    )]
    pub(crate) async fn try_decrease(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sku: SkuUuid,
        amount: u32,
    ) -> Result<Reservation, InventoryError> {
        if amount == 0 {
            return Err(InventoryError::InvalidAmount);
        }

        let remaining: Option<i64> = query_scalar(DECREASE_STOCK_SQL)
            .bind(sku.into_uuid())
            .bind(i64::from(amount))
            .fetch_optional(&mut **tx)
            .await?;

        if let Some(remaining) = remaining {
            debug!(remaining, "reserved stock");

            return Ok(Reservation::Reserved {
                remaining: to_stock(remaining)?,
            });
        }

        let available = self.get_stock(tx, sku).await?;

        debug!(available, "rejected stock reservation");

        Ok(Reservation::Insufficient { available })
    }

    /// Return `amount` units to stock, yielding the new level.
    #[tracing::instrument(
        name = "inventory.ledger.increase",
        skip(self, tx),
        fields(sku_uuid = %sku),
        err
    )]
    pub(crate) async fn increase(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sku: SkuUuid,
        amount: u32,
    ) -> Result<u64, InventoryError> {
        if amount == 0 {
            return Err(InventoryError::InvalidAmount);
        }

        let remaining: i64 = query_scalar(INCREASE_STOCK_SQL)
            .bind(sku.into_uuid())
            .bind(i64::from(amount))
            .fetch_one(&mut **tx)
            .await?;

        to_stock(remaining)
    }

    pub(crate) async fn get_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sku: SkuUuid,
    ) -> Result<u64, InventoryError> {
        let stock: i64 = query_scalar(GET_STOCK_SQL)
            .bind(sku.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        to_stock(stock)
    }
}

fn to_stock(value: i64) -> Result<u64, InventoryError> {
    u64::try_from(value).map_err(|_negative| InventoryError::InvalidData)
}
