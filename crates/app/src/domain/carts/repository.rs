//! Cart Items Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use tracing::debug;

use crate::{
    database::try_get_u32,
    domain::{
        carts::records::{CartItemRecord, CartItemUuid},
        products::records::SkuUuid,
        users::UserUuid,
    },
    uuids::to_uuids,
};

const UPSERT_CART_ITEM_SQL: &str = include_str!("sql/upsert_cart_item.sql");
const LIST_CART_ITEMS_SQL: &str = include_str!("sql/list_cart_items.sql");
const DELETE_CART_ITEM_SQL: &str = include_str!("sql/delete_cart_item.sql");
const DELETE_CART_ITEMS_FOR_SKUS_SQL: &str = include_str!("sql/delete_cart_items_for_skus.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartItemsRepository;

impl PgCartItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert the line, or add `amount` to the existing `(user, sku)` line.
    ///
    /// The merge happens inside `ON CONFLICT`, so two concurrent adds can't
    /// overwrite each other's increment.
    pub(crate) async fn upsert_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        sku: SkuUuid,
        amount: u32,
    ) -> Result<CartItemRecord, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(UPSERT_CART_ITEM_SQL)
            .bind(CartItemUuid::new().into_uuid())
            .bind(user.into_uuid())
            .bind(sku.into_uuid())
            .bind(i64::from(amount))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<CartItemRecord>, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(LIST_CART_ITEMS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn delete_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        sku: SkuUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_ITEM_SQL)
            .bind(user.into_uuid())
            .bind(sku.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Remove the user's lines for exactly the given SKUs.
    pub(crate) async fn delete_items_for_skus(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        skus: &[SkuUuid],
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_ITEMS_FOR_SKUS_SQL)
            .bind(user.into_uuid())
            .bind(to_uuids(skus))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        debug!(rows_affected, "removed ordered skus from cart");

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for CartItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CartItemUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            sku_uuid: SkuUuid::from_uuid(row.try_get("sku_uuid")?),
            amount: try_get_u32(row, "amount")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
