//! Worker Config

use std::time::Duration;

use clap::Args;

use crate::worker::WorkerSettings;

/// Delayed job worker settings.
#[derive(Debug, Clone, Args)]
pub struct WorkerConfig {
    /// Milliseconds between polls of the delay queue
    #[arg(long, env = "WORKER_POLL_INTERVAL_MS", default_value_t = 1_000_u64)]
    pub poll_interval_ms: u64,

    /// Maximum jobs claimed per poll
    #[arg(long, env = "WORKER_BATCH_SIZE", default_value_t = 50_u32)]
    pub batch_size: u32,

    /// Seconds a claimed job stays hidden from other workers
    #[arg(long, env = "WORKER_LEASE_SECONDS", default_value_t = 60_u64)]
    pub lease_seconds: u64,

    /// Seconds before a failed job is retried
    #[arg(long, env = "WORKER_RETRY_DELAY_SECONDS", default_value_t = 30_u64)]
    pub retry_delay_seconds: u64,
}

impl WorkerConfig {
    #[must_use]
    pub fn settings(&self) -> WorkerSettings {
        WorkerSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            batch_size: self.batch_size,
            lease: Duration::from_secs(self.lease_seconds),
            retry_delay: Duration::from_secs(self.retry_delay_seconds),
        }
    }
}
