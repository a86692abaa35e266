//! Orders Config

use std::time::Duration;

use clap::Args;

/// Order lifecycle settings.
#[derive(Debug, Clone, Args)]
pub struct OrdersConfig {
    /// Seconds an unpaid order stays open before it is closed
    #[arg(long, env = "ORDER_TTL_SECONDS", default_value_t = 1_800_u64)]
    pub order_ttl_seconds: u64,
}

impl OrdersConfig {
    #[must_use]
    pub fn order_ttl(&self) -> Duration {
        Duration::from_secs(self.order_ttl_seconds)
    }
}
