//! Products Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use tracing::debug;

use crate::{
    database::try_get_u64,
    domain::products::{
        data::{NewProduct, NewSku},
        errors::ProductsServiceError,
        records::{ProductRecord, ProductUuid, SkuRecord, SkuUuid},
    },
    uuids::to_uuids,
};

const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const CREATE_SKU_SQL: &str = include_str!("sql/create_sku.sql");
const GET_SKU_SQL: &str = include_str!("sql/get_sku.sql");
const LOCK_SKUS_SQL: &str = include_str!("sql/lock_skus.sql");
const UPDATE_SKU_PRICE_SQL: &str = include_str!("sql/update_sku_price.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: NewProduct,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(product.title)
            .bind(product.description)
            .bind(product.on_sale)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_sku(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sku: NewSku,
    ) -> Result<SkuRecord, ProductsServiceError> {
        let price = i64::try_from(sku.price)?;
        let stock = i64::try_from(sku.stock)?;

        query_as::<Postgres, SkuRecord>(CREATE_SKU_SQL)
            .bind(sku.uuid.into_uuid())
            .bind(sku.product_uuid.into_uuid())
            .bind(sku.title)
            .bind(sku.description)
            .bind(price)
            .bind(stock)
            .fetch_one(&mut **tx)
            .await
            .map_err(ProductsServiceError::from)
    }

    pub(crate) async fn get_sku(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sku: SkuUuid,
    ) -> Result<SkuRecord, sqlx::Error> {
        query_as::<Postgres, SkuRecord>(GET_SKU_SQL)
            .bind(sku.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Lock the given SKU rows for the rest of the transaction.
    ///
    /// Rows are locked in UUID order so that two transactions locking
    /// overlapping sets always acquire them in the same sequence. Unknown SKUs
    /// are simply absent from the result.
    #[tracing::instrument(
        name = "products.repository.lock_skus",
        skip(self, tx, skus),
        fields(requested = skus.len(), locked = tracing::field::Empty),
        err
    )]
    pub(crate) async fn lock_skus(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        skus: &[SkuUuid],
    ) -> Result<Vec<SkuRecord>, sqlx::Error> {
        let locked = query_as::<Postgres, SkuRecord>(LOCK_SKUS_SQL)
            .bind(to_uuids(skus))
            .fetch_all(&mut **tx)
            .await?;

        tracing::Span::current().record("locked", locked.len());

        debug!(locked = locked.len(), "locked sku rows");

        Ok(locked)
    }

    pub(crate) async fn update_sku_price(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sku: SkuUuid,
        price: i64,
    ) -> Result<SkuRecord, sqlx::Error> {
        query_as::<Postgres, SkuRecord>(UPDATE_SKU_PRICE_SQL)
            .bind(sku.into_uuid())
            .bind(price)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            on_sale: row.try_get("on_sale")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for SkuRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: SkuUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            price: try_get_u64(row, "price")?,
            stock: try_get_u64(row, "stock")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
