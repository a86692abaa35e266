//! Products service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::products::{
        data::{NewProduct, NewSku},
        errors::ProductsServiceError,
        records::{ProductRecord, SkuRecord, SkuUuid},
        repository::PgProductsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgProductsService {
    db: Db,
    repository: PgProductsRepository,
}

impl PgProductsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl ProductsService for PgProductsService {
    #[tracing::instrument(
        name = "products.service.create_product",
        skip(self, product),
        fields(product_uuid = %product.uuid),
        err
    )]
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_product(&mut tx, product).await?;

        tx.commit().await?;

        info!(product_uuid = %created.uuid, "created product");

        Ok(created)
    }

    #[tracing::instrument(
        name = "products.service.create_sku",
        skip(self, sku),
        fields(sku_uuid = %sku.uuid, product_uuid = %sku.product_uuid),
        err
    )]
    async fn create_sku(&self, sku: NewSku) -> Result<SkuRecord, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_sku(&mut tx, sku).await?;

        tx.commit().await?;

        info!(sku_uuid = %created.uuid, stock = created.stock, "created sku");

        Ok(created)
    }

    async fn get_sku(&self, sku: SkuUuid) -> Result<SkuRecord, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.get_sku(&mut tx, sku).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "products.service.update_sku_price",
        skip(self),
        fields(sku_uuid = %sku),
        err
    )]
    async fn update_sku_price(
        &self,
        sku: SkuUuid,
        price: u64,
    ) -> Result<SkuRecord, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .update_sku_price(&mut tx, sku, i64::try_from(price)?)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Creates a new product.
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Creates a purchasable SKU under an existing product.
    async fn create_sku(&self, sku: NewSku) -> Result<SkuRecord, ProductsServiceError>;

    /// Retrieve a single SKU with its current price and stock.
    async fn get_sku(&self, sku: SkuUuid) -> Result<SkuRecord, ProductsServiceError>;

    /// Change a SKU's catalog price. Already placed orders keep the price they
    /// were placed at.
    async fn update_sku_price(
        &self,
        sku: SkuUuid,
        price: u64,
    ) -> Result<SkuRecord, ProductsServiceError>;
}
