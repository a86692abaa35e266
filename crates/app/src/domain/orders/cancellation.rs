//! Order cancellation.
//!
//! Every placed order gets a `close_order` job on the delay queue. When the
//! job comes due, [`CancellationScheduler::handle_expiry`] closes the order if
//! it is still pending and returns its reserved stock. The close is a
//! conditional status update, so a job delivered twice (or racing a payment)
//! releases stock at most once.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, info, warn};

use crate::{
    database::Db,
    domain::{
        inventory::{InventoryError, ledger::PgInventoryLedger},
        jobs::{DelayQueue, Job, records::JobUuid},
        orders::{
            errors::CancellationError,
            records::{OrderStatus, OrderUuid},
            repositories::{PgOrderItemsRepository, PgOrdersRepository},
        },
    },
};

/// What handling an expired order did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryOutcome {
    /// The order was pending and is now closed; stock of `released_lines`
    /// lines went back to inventory.
    Closed { released_lines: usize },

    /// The order had already left `pending`; nothing changed.
    Skipped { status: OrderStatus },

    /// No such order.
    Missing,
}

#[derive(Clone)]
pub struct PgCancellationScheduler {
    db: Db,
    queue: Arc<dyn DelayQueue>,
    orders_repository: PgOrdersRepository,
    items_repository: PgOrderItemsRepository,
    ledger: PgInventoryLedger,
}

impl PgCancellationScheduler {
    #[must_use]
    pub fn new(db: Db, queue: Arc<dyn DelayQueue>) -> Self {
        Self {
            db,
            queue,
            orders_repository: PgOrdersRepository::new(),
            items_repository: PgOrderItemsRepository::new(),
            ledger: PgInventoryLedger::new(),
        }
    }
}

#[async_trait]
impl CancellationScheduler for PgCancellationScheduler {
    async fn schedule(
        &self,
        order: OrderUuid,
        ttl: Duration,
    ) -> Result<JobUuid, CancellationError> {
        let job = self
            .queue
            .enqueue(Job::CloseOrder { order_uuid: order }, ttl)
            .await?;

        debug!(order_uuid = %order, job_uuid = %job, ttl_secs = ttl.as_secs(), "scheduled order expiry");

        Ok(job)
    }

    #[tracing::instrument(
        name = "orders.cancellation.handle_expiry",
        skip(self),
        fields(order_uuid = %order),
        err
    )]
    async fn handle_expiry(&self, order: OrderUuid) -> Result<ExpiryOutcome, CancellationError> {
        let mut tx = self.db.begin().await?;

        let Some(closed) = self
            .orders_repository
            .close_pending_order(&mut tx, order)
            .await?
        else {
            let outcome = match self.orders_repository.get_order_status(&mut tx, order).await? {
                Some(status) => ExpiryOutcome::Skipped { status },
                None => ExpiryOutcome::Missing,
            };

            tx.commit().await?;

            if outcome == ExpiryOutcome::Missing {
                warn!("expired order does not exist");
            } else {
                debug!(?outcome, "order no longer pending");
            }

            return Ok(outcome);
        };

        let mut items = self.items_repository.get_items(&mut tx, &[closed.uuid]).await?;

        // Same lock order as order placement.
        items.sort_by_key(|item| item.sku_uuid);

        for item in &items {
            match self.ledger.increase(&mut tx, item.sku_uuid, item.amount).await {
                Ok(_) => {}
                Err(InventoryError::NotFound) => {
                    warn!(sku_uuid = %item.sku_uuid, amount = item.amount, "sku removed; stock not released");
                }
                Err(error) => return Err(error.into()),
            }
        }

        tx.commit().await?;

        info!(released_lines = items.len(), "closed expired order");

        Ok(ExpiryOutcome::Closed {
            released_lines: items.len(),
        })
    }
}

#[automock]
#[async_trait]
pub trait CancellationScheduler: Send + Sync {
    /// Enqueue a best-effort close of `order` after `ttl`.
    async fn schedule(&self, order: OrderUuid, ttl: Duration)
    -> Result<JobUuid, CancellationError>;

    /// Close `order` if it is still pending and return its stock. Safe to call
    /// any number of times.
    async fn handle_expiry(&self, order: OrderUuid) -> Result<ExpiryOutcome, CancellationError>;
}
