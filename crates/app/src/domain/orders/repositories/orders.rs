//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar, types::Json};

use crate::{
    database::try_get_u64,
    domain::{
        orders::records::{AddressSnapshot, OrderRecord, OrderStatus, OrderUuid},
        users::UserUuid,
    },
};

const CREATE_ORDER_SQL: &str = include_str!("../sql/create_order.sql");
const UPDATE_ORDER_TOTAL_SQL: &str = include_str!("../sql/update_order_total.sql");
const GET_ORDER_SQL: &str = include_str!("../sql/get_order.sql");
const LIST_ORDERS_SQL: &str = include_str!("../sql/list_orders.sql");
const COUNT_ORDERS_SQL: &str = include_str!("../sql/count_orders.sql");
const GET_ORDER_STATUS_SQL: &str = include_str!("../sql/get_order_status.sql");
const MARK_ORDER_PAID_SQL: &str = include_str!("../sql/mark_order_paid.sql");
const CLOSE_PENDING_ORDER_SQL: &str = include_str!("../sql/close_pending_order.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert a pending order with a zero total. Records returned from here
    /// carry no items.
    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: OrderUuid,
        user: UserUuid,
        address: &AddressSnapshot,
        remark: Option<&str>,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(uuid.into_uuid())
            .bind(user.into_uuid())
            .bind(Json(address))
            .bind(remark)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_total(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        total_amount: i64,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_ORDER_TOTAL_SQL)
            .bind(order.into_uuid())
            .bind(total_amount)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_ORDERS_SQL)
            .bind(user.into_uuid())
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn count_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<i64, sqlx::Error> {
        query_scalar(COUNT_ORDERS_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Current status of any user's order, or `None` when it doesn't exist.
    pub(crate) async fn get_order_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Option<OrderStatus>, sqlx::Error> {
        let status: Option<String> = query_scalar(GET_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        status.map(|status| parse_status(&status)).transpose()
    }

    /// Move a pending order to `paid`. `None` means the order was not pending
    /// (or not the user's) and nothing changed.
    pub(crate) async fn mark_paid(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(MARK_ORDER_PAID_SQL)
            .bind(order.into_uuid())
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Move a pending order to `closed`. At most one caller ever sees `Some`
    /// for a given order.
    pub(crate) async fn close_pending_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(CLOSE_PENDING_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }
}

fn parse_status(value: &str) -> Result<OrderStatus, sqlx::Error> {
    value.parse().map_err(|e| sqlx::Error::ColumnDecode {
        index: "status".to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            address: row.try_get::<Json<AddressSnapshot>, _>("address")?.0,
            remark: row.try_get("remark")?,
            total_amount: try_get_u64(row, "total_amount")?,
            status: parse_status(&status)?,
            items: Vec::new(),
            paid_at: row
                .try_get::<Option<SqlxTimestamp>, _>("paid_at")?
                .map(SqlxTimestamp::to_jiff),
            closed_at: row
                .try_get::<Option<SqlxTimestamp>, _>("closed_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
