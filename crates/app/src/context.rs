//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    config::{DatabaseConfig, OrdersConfig, WorkerConfig},
    database::{self, Db},
    domain::{
        addresses::{AddressesService, PgAddressesService},
        carts::{CartsService, PgCartsService},
        inventory::{InventoryService, PgInventoryService},
        jobs::{DelayQueue, PgDelayQueue},
        orders::{CancellationScheduler, OrdersService, PgCancellationScheduler, PgOrdersService},
        products::{PgProductsService, ProductsService},
    },
    worker::JobWorker,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub inventory: Arc<dyn InventoryService>,
    pub addresses: Arc<dyn AddressesService>,
    pub carts: Arc<dyn CartsService>,
    pub orders: Arc<dyn OrdersService>,
    pub queue: Arc<dyn DelayQueue>,
    pub cancellations: Arc<dyn CancellationScheduler>,
}

impl AppContext {
    /// Connect to the database and wire every service.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_config(
        database: &DatabaseConfig,
        orders: &OrdersConfig,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(&database.database_url)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::from_db(Db::new(pool), orders))
    }

    #[must_use]
    pub fn from_db(db: Db, orders: &OrdersConfig) -> Self {
        let queue: Arc<dyn DelayQueue> = Arc::new(PgDelayQueue::new(db.clone()));
        let cancellations: Arc<dyn CancellationScheduler> =
            Arc::new(PgCancellationScheduler::new(db.clone(), Arc::clone(&queue)));

        Self {
            products: Arc::new(PgProductsService::new(db.clone())),
            inventory: Arc::new(PgInventoryService::new(db.clone())),
            addresses: Arc::new(PgAddressesService::new(db.clone())),
            carts: Arc::new(PgCartsService::new(db.clone())),
            orders: Arc::new(PgOrdersService::new(
                db,
                Arc::clone(&cancellations),
                orders.order_ttl(),
            )),
            queue,
            cancellations,
        }
    }

    /// A job worker over this context's queue and expiry handler.
    #[must_use]
    pub fn worker(&self, config: &WorkerConfig) -> JobWorker {
        JobWorker::new(
            Arc::clone(&self.queue),
            Arc::clone(&self.cancellations),
            config.settings(),
        )
    }
}
