//! Order Items Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::{try_get_u32, try_get_u64},
    domain::{
        orders::records::{OrderItemRecord, OrderItemUuid, OrderUuid},
        products::records::{ProductUuid, SkuUuid},
    },
    uuids::to_uuids,
};

const CREATE_ORDER_ITEM_SQL: &str = include_str!("../sql/create_order_item.sql");
const GET_ORDER_ITEMS_SQL: &str = include_str!("../sql/get_order_items.sql");

/// Columns of a new order line.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NewOrderLine {
    pub order_uuid: OrderUuid,
    pub product_uuid: ProductUuid,
    pub sku_uuid: SkuUuid,
    pub price: i64,
    pub amount: u32,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrderItemsRepository;

impl PgOrderItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        line: NewOrderLine,
    ) -> Result<OrderItemRecord, sqlx::Error> {
        query_as::<Postgres, OrderItemRecord>(CREATE_ORDER_ITEM_SQL)
            .bind(OrderItemUuid::new().into_uuid())
            .bind(line.order_uuid.into_uuid())
            .bind(line.product_uuid.into_uuid())
            .bind(line.sku_uuid.into_uuid())
            .bind(line.price)
            .bind(i64::from(line.amount))
            .fetch_one(&mut **tx)
            .await
    }

    /// Lines of all given orders, oldest first.
    pub(crate) async fn get_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &[OrderUuid],
    ) -> Result<Vec<OrderItemRecord>, sqlx::Error> {
        query_as::<Postgres, OrderItemRecord>(GET_ORDER_ITEMS_SQL)
            .bind(to_uuids(orders))
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderItemUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            sku_uuid: SkuUuid::from_uuid(row.try_get("sku_uuid")?),
            price: try_get_u64(row, "price")?,
            amount: try_get_u32(row, "amount")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
