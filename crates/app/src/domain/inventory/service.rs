//! Inventory service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        inventory::{errors::InventoryError, ledger::PgInventoryLedger},
        products::records::SkuUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgInventoryService {
    db: Db,
    ledger: PgInventoryLedger,
}

impl PgInventoryService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            ledger: PgInventoryLedger::new(),
        }
    }
}

#[async_trait]
impl InventoryService for PgInventoryService {
    async fn get_stock(&self, sku: SkuUuid) -> Result<u64, InventoryError> {
        let mut tx = self.db.begin().await?;

        let stock = self.ledger.get_stock(&mut tx, sku).await?;

        tx.commit().await?;

        Ok(stock)
    }

    #[tracing::instrument(
        name = "inventory.service.restock",
        skip(self),
        fields(sku_uuid = %sku),
        err
    )]
    async fn restock(&self, sku: SkuUuid, amount: u32) -> Result<u64, InventoryError> {
        let mut tx = self.db.begin().await?;

        let stock = self.ledger.increase(&mut tx, sku, amount).await?;

        tx.commit().await?;

        info!(sku_uuid = %sku, amount, stock, "restocked sku");

        Ok(stock)
    }
}

#[automock]
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Current stock level of a SKU.
    async fn get_stock(&self, sku: SkuUuid) -> Result<u64, InventoryError>;

    /// Add `amount` units to a SKU's stock and return the new level.
    async fn restock(&self, sku: SkuUuid, amount: u32) -> Result<u64, InventoryError>;
}
