//! Database connection management

use sqlx::{
    PgPool, Postgres, Row, Transaction,
    error::DatabaseError,
    migrate::{MigrateError, Migrator},
    postgres::PgRow,
};

/// Migrations bundled from the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// `SQLSTATE` raised when Postgres aborts a transaction to break a deadlock.
const DEADLOCK_DETECTED: &str = "40P01";

/// `SQLSTATE` raised when a serializable transaction cannot be committed.
const SERIALIZATION_FAILURE: &str = "40001";

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error when no connection can be acquired or `BEGIN` fails.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if a migration fails or the applied history diverges.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Whether the error is a deadlock or serialization failure that the caller can
/// resolve by retrying the whole transaction.
pub(crate) fn is_concurrency_conflict(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .and_then(DatabaseError::code)
        .is_some_and(|code| code == DEADLOCK_DETECTED || code == SERIALIZATION_FAILURE)
}

/// Read a non-negative `BIGINT` column as `u64`.
pub(crate) fn try_get_u64(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let value: i64 = row.try_get(col)?;

    u64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Read a positive `BIGINT` quantity column as `u32`.
pub(crate) fn try_get_u32(row: &PgRow, col: &str) -> Result<u32, sqlx::Error> {
    let value: i64 = row.try_get(col)?;

    u32::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_is_not_a_conflict() {
        assert!(!is_concurrency_conflict(&sqlx::Error::RowNotFound));
    }
}
