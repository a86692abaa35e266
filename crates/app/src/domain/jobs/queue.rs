//! Delay Queue

use std::time::Duration;

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use serde_json::Value;
use sqlx::{FromRow, Postgres, Row, postgres::PgRow, query, query_as, query_scalar, types::Json};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    database::Db,
    domain::jobs::{
        data::Job,
        errors::JobsError,
        records::{DelayedJobRecord, JobUuid},
    },
};

const ENQUEUE_JOB_SQL: &str = include_str!("sql/enqueue_job.sql");
const CLAIM_DUE_JOBS_SQL: &str = include_str!("sql/claim_due_jobs.sql");
const COMPLETE_JOB_SQL: &str = include_str!("sql/complete_job.sql");
const RELEASE_JOB_SQL: &str = include_str!("sql/release_job.sql");

#[cfg(test)]
const GET_JOB_SQL: &str = include_str!("sql/get_job.sql");

/// PostgreSQL-backed delay queue.
#[derive(Debug, Clone)]
pub struct PgDelayQueue {
    db: Db,
}

impl PgDelayQueue {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    #[cfg(test)]
    pub(crate) async fn get_job(&self, job: JobUuid) -> Result<DelayedJobRecord, JobsError> {
        query_as::<Postgres, DelayedJobRecord>(GET_JOB_SQL)
            .bind(job.into_uuid())
            .fetch_one(self.db.pool())
            .await
            .map_err(JobsError::from)
    }
}

#[async_trait]
impl DelayQueue for PgDelayQueue {
    #[tracing::instrument(
        name = "jobs.queue.enqueue",
        skip(self, job),
        fields(kind = job.kind(), delay_ms = tracing::field::Empty),
        err
    )]
    async fn enqueue(&self, job: Job, delay: Duration) -> Result<JobUuid, JobsError> {
        let delay_ms = millis(delay)?;

        tracing::Span::current().record("delay_ms", delay_ms);

        let uuid: Uuid = query_scalar(ENQUEUE_JOB_SQL)
            .bind(JobUuid::new().into_uuid())
            .bind(job.kind())
            .bind(Json(&job))
            .bind(delay_ms)
            .fetch_one(self.db.pool())
            .await?;

        let uuid = JobUuid::from_uuid(uuid);

        info!(job_uuid = %uuid, kind = job.kind(), delay_ms, "enqueued delayed job");

        Ok(uuid)
    }

    #[tracing::instrument(
        name = "jobs.queue.claim_due",
        skip(self),
        fields(claimed = tracing::field::Empty),
        err
    )]
    async fn claim_due(
        &self,
        limit: u32,
        lease: Duration,
    ) -> Result<Vec<DelayedJobRecord>, JobsError> {
        let jobs = query_as::<Postgres, DelayedJobRecord>(CLAIM_DUE_JOBS_SQL)
            .bind(i64::from(limit))
            .bind(millis(lease)?)
            .fetch_all(self.db.pool())
            .await?;

        tracing::Span::current().record("claimed", jobs.len());

        debug!(claimed = jobs.len(), "claimed due jobs");

        Ok(jobs)
    }

    async fn complete(&self, job: JobUuid) -> Result<(), JobsError> {
        let rows_affected = query(COMPLETE_JOB_SQL)
            .bind(job.into_uuid())
            .execute(self.db.pool())
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(JobsError::NotFound);
        }

        Ok(())
    }

    async fn release(
        &self,
        job: JobUuid,
        error: String,
        retry_delay: Duration,
    ) -> Result<(), JobsError> {
        query(RELEASE_JOB_SQL)
            .bind(job.into_uuid())
            .bind(error)
            .bind(millis(retry_delay)?)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait DelayQueue: Send + Sync {
    /// Schedule `job` to become claimable no earlier than `delay` from now.
    async fn enqueue(&self, job: Job, delay: Duration) -> Result<JobUuid, JobsError>;

    /// Claim up to `limit` due jobs, leasing each for `lease`.
    async fn claim_due(
        &self,
        limit: u32,
        lease: Duration,
    ) -> Result<Vec<DelayedJobRecord>, JobsError>;

    /// Acknowledge a claimed job so it is never delivered again.
    async fn complete(&self, job: JobUuid) -> Result<(), JobsError>;

    /// Give a claimed job back for redelivery after `retry_delay`.
    async fn release(
        &self,
        job: JobUuid,
        error: String,
        retry_delay: Duration,
    ) -> Result<(), JobsError>;
}

fn millis(duration: Duration) -> Result<i64, JobsError> {
    Ok(i64::try_from(duration.as_millis())?)
}

impl<'r> FromRow<'r, PgRow> for DelayedJobRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let attempts: i32 = row.try_get("attempts")?;

        Ok(Self {
            uuid: JobUuid::from_uuid(row.try_get("uuid")?),
            kind: row.try_get("kind")?,
            payload: row.try_get::<Json<Value>, _>("payload")?.0,
            run_at: row.try_get::<SqlxTimestamp, _>("run_at")?.to_jiff(),
            attempts: u32::try_from(attempts).map_err(|e| sqlx::Error::ColumnDecode {
                index: "attempts".to_string(),
                source: Box::new(e),
            })?,
            locked_until: row
                .try_get::<Option<SqlxTimestamp>, _>("locked_until")?
                .map(SqlxTimestamp::to_jiff),
            last_error: row.try_get("last_error")?,
            completed_at: row
                .try_get::<Option<SqlxTimestamp>, _>("completed_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
