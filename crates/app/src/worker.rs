//! Delayed job worker.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use crate::domain::{
    jobs::{DelayQueue, Job, JobsError, records::DelayedJobRecord},
    orders::{CancellationScheduler, ExpiryOutcome},
};

/// Polling and retry behaviour of a [`JobWorker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSettings {
    pub poll_interval: Duration,
    pub batch_size: u32,

    /// How long a claimed job stays invisible to other workers.
    pub lease: Duration,

    pub retry_delay: Duration,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            batch_size: 50,
            lease: Duration::from_secs(60),
            retry_delay: Duration::from_secs(30),
        }
    }
}

/// Counts from a single poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub claimed: usize,
    pub completed: usize,
    pub released: usize,
    pub dropped: usize,
}

#[derive(Clone)]
pub struct JobWorker {
    queue: Arc<dyn DelayQueue>,
    cancellations: Arc<dyn CancellationScheduler>,
    settings: WorkerSettings,
}

impl JobWorker {
    #[must_use]
    pub fn new(
        queue: Arc<dyn DelayQueue>,
        cancellations: Arc<dyn CancellationScheduler>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            queue,
            cancellations,
            settings,
        }
    }

    /// Claim one batch of due jobs and handle each of them.
    ///
    /// Handler failures release the job for a later retry; undecodable
    /// payloads and jobs for missing orders are acknowledged and dropped.
    ///
    /// # Errors
    ///
    /// Returns an error when the queue itself can't be read or acknowledged.
    /// Jobs already claimed in this batch are redelivered once their lease
    /// expires.
    #[tracing::instrument(
        name = "worker.run_once",
        skip(self),
        fields(claimed = tracing::field::Empty),
        err
    )]
    pub async fn run_once(&self) -> Result<WorkerStats, JobsError> {
        let jobs = self
            .queue
            .claim_due(self.settings.batch_size, self.settings.lease)
            .await?;

        tracing::Span::current().record("claimed", jobs.len());

        let mut stats = WorkerStats {
            claimed: jobs.len(),
            ..WorkerStats::default()
        };

        for record in jobs {
            self.dispatch(&record, &mut stats).await?;
        }

        Ok(stats)
    }

    async fn dispatch(
        &self,
        record: &DelayedJobRecord,
        stats: &mut WorkerStats,
    ) -> Result<(), JobsError> {
        let job = match record.job() {
            Ok(job) => job,
            Err(err) => {
                warn!(
                    job_uuid = %record.uuid,
                    kind = %record.kind,
                    error = %err,
                    "dropping job with undecodable payload"
                );

                self.queue.complete(record.uuid).await?;
                stats.dropped += 1;

                return Ok(());
            }
        };

        match job {
            Job::CloseOrder { order_uuid } => {
                match self.cancellations.handle_expiry(order_uuid).await {
                    Ok(ExpiryOutcome::Missing) => {
                        self.queue.complete(record.uuid).await?;
                        stats.dropped += 1;
                    }
                    Ok(outcome) => {
                        debug!(job_uuid = %record.uuid, ?outcome, "handled order expiry");

                        self.queue.complete(record.uuid).await?;
                        stats.completed += 1;
                    }
                    Err(err) => {
                        warn!(
                            job_uuid = %record.uuid,
                            attempts = record.attempts,
                            error = %err,
                            "order expiry failed; releasing job"
                        );

                        self.queue
                            .release(record.uuid, err.to_string(), self.settings.retry_delay)
                            .await?;
                        stats.released += 1;
                    }
                }
            }
        }

        Ok(())
    }

    /// Poll until `shutdown` turns `true` or its sender is dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.settings.poll_interval.max(Duration::from_millis(1)));

        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            batch_size = self.settings.batch_size,
            poll_interval_ms = self.settings.poll_interval.as_millis(),
            "job worker started"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.run_once().await {
                        Ok(stats) if stats.claimed > 0 => {
                            info!(
                                claimed = stats.claimed,
                                completed = stats.completed,
                                released = stats.released,
                                dropped = stats.dropped,
                                "processed delayed jobs"
                            );
                        }
                        Ok(_) => {}
                        Err(err) => error!(error = %err, "job worker poll failed"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("job worker stopped");
    }
}
