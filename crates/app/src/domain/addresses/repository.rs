//! Addresses Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::{
    addresses::{
        data::NewAddress,
        records::{AddressRecord, AddressUuid},
    },
    users::UserUuid,
};

const CREATE_ADDRESS_SQL: &str = include_str!("sql/create_address.sql");
const GET_ADDRESS_SQL: &str = include_str!("sql/get_address.sql");
const TOUCH_LAST_USED_SQL: &str = include_str!("sql/touch_last_used.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgAddressesRepository;

impl PgAddressesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        address: NewAddress,
    ) -> Result<AddressRecord, sqlx::Error> {
        query_as::<Postgres, AddressRecord>(CREATE_ADDRESS_SQL)
            .bind(address.uuid.into_uuid())
            .bind(user.into_uuid())
            .bind(address.province)
            .bind(address.city)
            .bind(address.district)
            .bind(address.address)
            .bind(address.zip)
            .bind(address.contact_name)
            .bind(address.contact_phone)
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch an address owned by `user`; another user's address is not found.
    pub(crate) async fn get_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<AddressRecord, sqlx::Error> {
        query_as::<Postgres, AddressRecord>(GET_ADDRESS_SQL)
            .bind(address.into_uuid())
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn touch_last_used(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        address: AddressUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(TOUCH_LAST_USED_SQL)
            .bind(address.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for AddressRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: AddressUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            province: row.try_get("province")?,
            city: row.try_get("city")?,
            district: row.try_get("district")?,
            address: row.try_get("address")?,
            zip: row.try_get("zip")?,
            contact_name: row.try_get("contact_name")?,
            contact_phone: row.try_get("contact_phone")?,
            last_used_at: row
                .try_get::<Option<SqlxTimestamp>, _>("last_used_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
