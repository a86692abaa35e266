//! Orders service.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use sqlx::{Postgres, Transaction};
use tracing::{debug, error, info, warn};

use crate::{
    database::Db,
    domain::{
        addresses::repository::PgAddressesRepository,
        carts::repository::PgCartItemsRepository,
        inventory::{Reservation, ledger::PgInventoryLedger},
        orders::{
            cancellation::CancellationScheduler,
            data::{NewOrder, PageRequest},
            errors::OrdersServiceError,
            records::{AddressSnapshot, OrderItemRecord, OrderRecord, OrderUuid, Page},
            repositories::{PgOrderItemsRepository, PgOrdersRepository, items::NewOrderLine},
        },
        products::{
            records::{SkuRecord, SkuUuid},
            repository::PgProductsRepository,
        },
        users::UserUuid,
    },
};

#[derive(Clone)]
pub struct PgOrdersService {
    db: Db,
    scheduler: Arc<dyn CancellationScheduler>,
    order_ttl: Duration,
    orders_repository: PgOrdersRepository,
    items_repository: PgOrderItemsRepository,
    addresses_repository: PgAddressesRepository,
    products_repository: PgProductsRepository,
    carts_repository: PgCartItemsRepository,
    ledger: PgInventoryLedger,
}

impl PgOrdersService {
    /// Orders placed through this service are scheduled to close after
    /// `order_ttl` unless paid first.
    #[must_use]
    pub fn new(db: Db, scheduler: Arc<dyn CancellationScheduler>, order_ttl: Duration) -> Self {
        Self {
            db,
            scheduler,
            order_ttl,
            orders_repository: PgOrdersRepository::new(),
            items_repository: PgOrderItemsRepository::new(),
            addresses_repository: PgAddressesRepository::new(),
            products_repository: PgProductsRepository::new(),
            carts_repository: PgCartItemsRepository::new(),
            ledger: PgInventoryLedger::new(),
        }
    }

    async fn attach_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &mut [OrderRecord],
    ) -> Result<(), OrdersServiceError> {
        if orders.is_empty() {
            return Ok(());
        }

        let uuids: SmallVec<[OrderUuid; 16]> = orders.iter().map(|order| order.uuid).collect();

        let mut by_order: FxHashMap<OrderUuid, Vec<OrderItemRecord>> = FxHashMap::default();

        for item in self.items_repository.get_items(tx, &uuids).await? {
            by_order.entry(item.order_uuid).or_default().push(item);
        }

        for order in orders {
            order.items = by_order.remove(&order.uuid).unwrap_or_default();
        }

        Ok(())
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.place_order",
        skip(self, order),
        fields(
            user_uuid = %user,
            address_uuid = %order.address_uuid,
            items = order.items.len(),
            order_uuid = tracing::field::Empty,
            total_amount = tracing::field::Empty
        ),
        err
    )]
    async fn place_order(
        &self,
        user: UserUuid,
        order: NewOrder,
    ) -> Result<OrderRecord, OrdersServiceError> {
        order.validate()?;

        let mut tx = self.db.begin().await?;

        let address = self
            .addresses_repository
            .get_address(&mut tx, user, order.address_uuid)
            .await
            .map_err(|error| match error {
                sqlx::Error::RowNotFound => OrdersServiceError::AddressNotFound,
                error => OrdersServiceError::from(error),
            })?;

        if self
            .addresses_repository
            .touch_last_used(&mut tx, address.uuid)
            .await?
            == 0
        {
            warn!(address_uuid = %address.uuid, "address vanished before it could be touched");
        }

        let snapshot = AddressSnapshot::from(&address);
        let order_uuid = OrderUuid::new();

        tracing::Span::current().record("order_uuid", tracing::field::display(order_uuid));

        self.orders_repository
            .create_order(&mut tx, order_uuid, user, &snapshot, order.remark.as_deref())
            .await?;

        let sku_uuids: SmallVec<[SkuUuid; 8]> =
            order.items.iter().map(|item| item.sku_uuid).collect();

        let skus: FxHashMap<SkuUuid, SkuRecord> = self
            .products_repository
            .lock_skus(&mut tx, &sku_uuids)
            .await?
            .into_iter()
            .map(|sku| (sku.uuid, sku))
            .collect();

        let mut total: u64 = 0;
        let mut items = Vec::with_capacity(order.items.len());

        for requested in &order.items {
            let sku = skus
                .get(&requested.sku_uuid)
                .ok_or(OrdersServiceError::SkuNotFound(requested.sku_uuid))?;

            let line = self
                .items_repository
                .create_item(
                    &mut tx,
                    NewOrderLine {
                        order_uuid,
                        product_uuid: sku.product_uuid,
                        sku_uuid: sku.uuid,
                        price: i64::try_from(sku.price)?,
                        amount: requested.amount,
                    },
                )
                .await?;

            if let Reservation::Insufficient { available } = self
                .ledger
                .try_decrease(&mut tx, sku.uuid, requested.amount)
                .await?
            {
                return Err(OrdersServiceError::InsufficientStock {
                    sku: sku.uuid,
                    requested: requested.amount,
                    available,
                });
            }

            total = sku
                .price
                .checked_mul(u64::from(requested.amount))
                .and_then(|line_total| total.checked_add(line_total))
                .ok_or(OrdersServiceError::InvalidInput("order total overflows"))?;

            items.push(line);
        }

        let mut placed = self
            .orders_repository
            .update_total(&mut tx, order_uuid, i64::try_from(total)?)
            .await?;

        let removed = self
            .carts_repository
            .delete_items_for_skus(&mut tx, user, &sku_uuids)
            .await?;

        tx.commit().await?;

        tracing::Span::current().record("total_amount", total);

        info!(
            order_uuid = %order_uuid,
            total_amount = total,
            cart_lines_removed = removed,
            "placed order"
        );

        if let Err(err) = self.scheduler.schedule(order_uuid, self.order_ttl).await {
            error!(order_uuid = %order_uuid, error = %err, "failed to schedule order expiry");
        }

        placed.items = items;

        Ok(placed)
    }

    async fn get_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.orders_repository.get_order(&mut tx, user, order).await?;
        let mut records = [record];

        self.attach_items(&mut tx, &mut records).await?;

        tx.commit().await?;

        let [record] = records;

        Ok(record)
    }

    #[tracing::instrument(
        name = "orders.service.list_orders",
        skip(self),
        fields(user_uuid = %user, returned = tracing::field::Empty),
        err
    )]
    async fn list_orders(
        &self,
        user: UserUuid,
        page: PageRequest,
    ) -> Result<Page<OrderRecord>, OrdersServiceError> {
        let page = page.normalized();

        let mut tx = self.db.begin().await?;

        let total = self.orders_repository.count_orders(&mut tx, user).await?;

        let mut orders = self
            .orders_repository
            .list_orders(&mut tx, user, i64::from(page.per_page), page.offset())
            .await?;

        self.attach_items(&mut tx, &mut orders).await?;

        tx.commit().await?;

        tracing::Span::current().record("returned", orders.len());

        debug!(returned = orders.len(), total, "listed orders");

        Ok(Page {
            items: orders,
            page: page.page,
            per_page: page.per_page,
            total: u64::try_from(total)?,
        })
    }

    #[tracing::instrument(
        name = "orders.service.mark_paid",
        skip(self),
        fields(user_uuid = %user, order_uuid = %order),
        err
    )]
    async fn mark_paid(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let Some(paid) = self.orders_repository.mark_paid(&mut tx, user, order).await? else {
            let current = self.orders_repository.get_order(&mut tx, user, order).await?;

            return Err(OrdersServiceError::InvalidStatus(current.status));
        };

        let mut records = [paid];

        self.attach_items(&mut tx, &mut records).await?;

        tx.commit().await?;

        let [paid] = records;

        info!(order_uuid = %paid.uuid, "marked order paid");

        Ok(paid)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Place an order from the given items in one transaction, reserving stock
    /// and clearing the matching cart lines.
    async fn place_order(
        &self,
        user: UserUuid,
        order: NewOrder,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Get one of the user's orders with its lines.
    async fn get_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// The user's orders, newest first.
    async fn list_orders(
        &self,
        user: UserUuid,
        page: PageRequest,
    ) -> Result<Page<OrderRecord>, OrdersServiceError>;

    /// Move a pending order to `paid`.
    async fn mark_paid(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{
            addresses::AddressesService,
            carts::CartsService,
            inventory::InventoryService,
            jobs::{
                DelayQueue, Job, JobsError,
                records::{DelayedJobRecord, JobUuid},
            },
            orders::{
                cancellation::MockCancellationScheduler, data::NewOrderItem,
                errors::CancellationError, records::OrderStatus,
            },
            products::ProductsService,
        },
        test::{TestContext, helpers},
    };

    use super::*;

    fn items(pairs: &[(SkuUuid, u32)]) -> Vec<NewOrderItem> {
        pairs
            .iter()
            .map(|&(sku_uuid, amount)| NewOrderItem { sku_uuid, amount })
            .collect()
    }

    #[tokio::test]
    async fn placing_order_totals_lines_and_clears_their_cart_entries() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let a = helpers::create_sku(&ctx, 10, 10).await?;
        let b = helpers::create_sku(&ctx, 5, 10).await?;
        let other = helpers::create_sku(&ctx, 7, 10).await?;
        let address = helpers::create_address(&ctx, user).await?;

        helpers::add_to_cart(&ctx, user, a.uuid, 2).await?;
        helpers::add_to_cart(&ctx, user, b.uuid, 1).await?;
        helpers::add_to_cart(&ctx, user, other.uuid, 4).await?;

        let order = ctx
            .orders
            .place_order(
                user,
                NewOrder {
                    address_uuid: address.uuid,
                    remark: Some("leave at the door".to_string()),
                    items: items(&[(a.uuid, 2), (b.uuid, 1)]),
                },
            )
            .await?;

        assert_eq!(order.total_amount, 25);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.remark.as_deref(), Some("leave at the door"));
        assert_eq!(order.address, AddressSnapshot::from(&address));

        let cart = ctx.carts.list_items(user).await?;

        assert_eq!(cart.len(), 1, "only the unordered sku stays in the cart");
        assert_eq!(cart.first().map(|line| line.sku_uuid), Some(other.uuid));

        assert_eq!(ctx.inventory.get_stock(a.uuid).await?, 8);
        assert_eq!(ctx.inventory.get_stock(b.uuid).await?, 9);

        Ok(())
    }

    #[tokio::test]
    async fn placing_order_marks_address_as_used() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let sku = helpers::create_sku(&ctx, 10, 10).await?;
        let address = helpers::create_address(&ctx, user).await?;

        ctx.orders
            .place_order(
                user,
                NewOrder {
                    address_uuid: address.uuid,
                    remark: None,
                    items: items(&[(sku.uuid, 1)]),
                },
            )
            .await?;

        let touched = ctx.addresses.get_address(user, address.uuid).await?;

        assert!(touched.last_used_at.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn placed_order_lines_keep_placement_time_prices() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let sku = helpers::create_sku(&ctx, 12_00, 10).await?;

        let order = helpers::place_order(&ctx, user, &[(sku.uuid, 3)]).await?;

        ctx.products.update_sku_price(sku.uuid, 99_00).await?;

        let fetched = ctx.orders.get_order(user, order.uuid).await?;

        assert_eq!(fetched.total_amount, 36_00);
        assert_eq!(fetched.items.first().map(|line| line.price), Some(12_00));
        assert_eq!(fetched.items.first().map(|line| line.amount), Some(3));

        Ok(())
    }

    #[tokio::test]
    async fn insufficient_stock_rolls_back_the_whole_order() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let plenty = helpers::create_sku(&ctx, 10, 10).await?;
        let scarce = helpers::create_sku(&ctx, 10, 1).await?;
        let address = helpers::create_address(&ctx, user).await?;

        helpers::add_to_cart(&ctx, user, plenty.uuid, 2).await?;
        helpers::add_to_cart(&ctx, user, scarce.uuid, 2).await?;

        let result = ctx
            .orders
            .place_order(
                user,
                NewOrder {
                    address_uuid: address.uuid,
                    remark: None,
                    items: items(&[(plenty.uuid, 2), (scarce.uuid, 2)]),
                },
            )
            .await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::InsufficientStock {
                    sku,
                    requested: 2,
                    available: 1,
                }) if sku == scarce.uuid
            ),
            "expected InsufficientStock, got {result:?}"
        );

        assert_eq!(ctx.inventory.get_stock(plenty.uuid).await?, 10);
        assert_eq!(ctx.inventory.get_stock(scarce.uuid).await?, 1);
        assert_eq!(
            ctx.orders.list_orders(user, PageRequest::default()).await?.total,
            0
        );
        assert_eq!(ctx.carts.list_items(user).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_sku_rolls_back_the_whole_order() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let sku = helpers::create_sku(&ctx, 10, 10).await?;
        let address = helpers::create_address(&ctx, user).await?;
        let missing = SkuUuid::new();

        let result = ctx
            .orders
            .place_order(
                user,
                NewOrder {
                    address_uuid: address.uuid,
                    remark: None,
                    items: items(&[(sku.uuid, 1), (missing, 1)]),
                },
            )
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::SkuNotFound(uuid)) if uuid == missing),
            "expected SkuNotFound, got {result:?}"
        );
        assert_eq!(ctx.inventory.get_stock(sku.uuid).await?, 10);
        assert_eq!(
            ctx.orders.list_orders(user, PageRequest::default()).await?.total,
            0
        );

        Ok(())
    }

    #[tokio::test]
    async fn another_users_address_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = UserUuid::new();
        let user = UserUuid::new();
        let sku = helpers::create_sku(&ctx, 10, 10).await?;
        let address = helpers::create_address(&ctx, owner).await?;

        let result = ctx
            .orders
            .place_order(
                user,
                NewOrder {
                    address_uuid: address.uuid,
                    remark: None,
                    items: items(&[(sku.uuid, 1)]),
                },
            )
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::AddressNotFound)),
            "expected AddressNotFound, got {result:?}"
        );
        assert_eq!(ctx.inventory.get_stock(sku.uuid).await?, 10);

        Ok(())
    }

    #[tokio::test]
    async fn invalid_order_is_rejected_before_touching_storage() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();

        let result = ctx
            .orders
            .place_order(
                user,
                NewOrder {
                    address_uuid: helpers::create_address(&ctx, user).await?.uuid,
                    remark: None,
                    items: Vec::new(),
                },
            )
            .await;

        assert!(matches!(result, Err(OrdersServiceError::InvalidInput(_))));

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn two_orders_for_the_last_units_only_one_wins() -> TestResult {
        let ctx = TestContext::new().await;
        let sku = helpers::create_sku(&ctx, 10, 5).await?;

        let mut handles = Vec::new();

        for _ in 0..2 {
            let orders = ctx.orders.clone();
            let user = UserUuid::new();
            let address = helpers::create_address(&ctx, user).await?;
            let sku_uuid = sku.uuid;

            handles.push(tokio::spawn(async move {
                orders
                    .place_order(
                        user,
                        NewOrder {
                            address_uuid: address.uuid,
                            remark: None,
                            items: vec![NewOrderItem {
                                sku_uuid,
                                amount: 3,
                            }],
                        },
                    )
                    .await
            }));
        }

        let mut placed = 0;
        let mut rejected = 0;

        for handle in handles {
            match handle.await? {
                Ok(_) => placed += 1,
                Err(OrdersServiceError::InsufficientStock { available: 2, .. }) => rejected += 1,
                Err(error) => return Err(error.into()),
            }
        }

        assert_eq!((placed, rejected), (1, 1));
        assert_eq!(ctx.inventory.get_stock(sku.uuid).await?, 2);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_placements_never_oversell() -> TestResult {
        let ctx = TestContext::new().await;
        let sku = helpers::create_sku(&ctx, 10, 10).await?;

        let mut handles = Vec::new();

        for _ in 0..8 {
            let orders = ctx.orders.clone();
            let user = UserUuid::new();
            let address = helpers::create_address(&ctx, user).await?;
            let sku_uuid = sku.uuid;

            handles.push(tokio::spawn(async move {
                orders
                    .place_order(
                        user,
                        NewOrder {
                            address_uuid: address.uuid,
                            remark: None,
                            items: vec![NewOrderItem {
                                sku_uuid,
                                amount: 3,
                            }],
                        },
                    )
                    .await
            }));
        }

        let mut placed: u64 = 0;

        for handle in handles {
            match handle.await? {
                Ok(_) => placed += 1,
                Err(OrdersServiceError::InsufficientStock { .. }) => {}
                Err(error) => return Err(error.into()),
            }
        }

        assert_eq!(placed, 3);
        assert_eq!(ctx.inventory.get_stock(sku.uuid).await?, 10 - placed * 3);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn overlapping_multi_sku_orders_do_not_deadlock() -> TestResult {
        let ctx = TestContext::new().await;
        let a = helpers::create_sku(&ctx, 10, 100).await?;
        let b = helpers::create_sku(&ctx, 10, 100).await?;

        let mut handles = Vec::new();

        for n in 0..10 {
            let orders = ctx.orders.clone();
            let user = UserUuid::new();
            let address = helpers::create_address(&ctx, user).await?;
            let pairs = if n % 2 == 0 {
                [(a.uuid, 1), (b.uuid, 1)]
            } else {
                [(b.uuid, 1), (a.uuid, 1)]
            };

            handles.push(tokio::spawn(async move {
                orders
                    .place_order(
                        user,
                        NewOrder {
                            address_uuid: address.uuid,
                            remark: None,
                            items: items(&pairs),
                        },
                    )
                    .await
            }));
        }

        for handle in handles {
            handle.await??;
        }

        assert_eq!(ctx.inventory.get_stock(a.uuid).await?, 90);
        assert_eq!(ctx.inventory.get_stock(b.uuid).await?, 90);

        Ok(())
    }

    #[tokio::test]
    async fn order_is_scheduled_to_expire_after_configured_ttl() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let sku = helpers::create_sku(&ctx, 10, 10).await?;
        let address = helpers::create_address(&ctx, user).await?;

        let mut scheduler = MockCancellationScheduler::new();

        scheduler
            .expect_schedule()
            .withf(|_, ttl| *ttl == Duration::from_secs(45))
            .times(1)
            .returning(|_, _| Ok(JobUuid::new()));

        let orders = ctx.orders_with(Arc::new(scheduler), Duration::from_secs(45));

        orders
            .place_order(
                user,
                NewOrder {
                    address_uuid: address.uuid,
                    remark: None,
                    items: items(&[(sku.uuid, 1)]),
                },
            )
            .await?;

        Ok(())
    }

    #[tokio::test]
    async fn scheduling_failure_keeps_the_committed_order() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let sku = helpers::create_sku(&ctx, 10, 10).await?;
        let address = helpers::create_address(&ctx, user).await?;

        let mut scheduler = MockCancellationScheduler::new();

        scheduler
            .expect_schedule()
            .times(1)
            .returning(|_, _| Err(CancellationError::Queue(JobsError::NotFound)));

        let orders = ctx.orders_with(Arc::new(scheduler), Duration::from_secs(60));

        let order = orders
            .place_order(
                user,
                NewOrder {
                    address_uuid: address.uuid,
                    remark: None,
                    items: items(&[(sku.uuid, 4)]),
                },
            )
            .await?;

        let fetched = ctx.orders.get_order(user, order.uuid).await?;

        assert_eq!(fetched.status, OrderStatus::Pending);
        assert_eq!(fetched.total_amount, 40);
        assert_eq!(ctx.inventory.get_stock(sku.uuid).await?, 6);

        Ok(())
    }

    #[tokio::test]
    async fn placed_order_gets_a_close_order_job() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let sku = helpers::create_sku(&ctx, 10, 10).await?;
        let address = helpers::create_address(&ctx, user).await?;

        let orders = ctx.orders_with(Arc::new(ctx.cancellations.clone()), Duration::ZERO);

        let order = orders
            .place_order(
                user,
                NewOrder {
                    address_uuid: address.uuid,
                    remark: None,
                    items: items(&[(sku.uuid, 1)]),
                },
            )
            .await?;

        let due = ctx.queue.claim_due(10, Duration::from_secs(60)).await?;

        assert_eq!(due.len(), 1);
        assert_eq!(
            due.first().map(DelayedJobRecord::job).transpose()?,
            Some(Job::CloseOrder {
                order_uuid: order.uuid
            })
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_orders_pages_newest_first_with_lines() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let sku = helpers::create_sku(&ctx, 10, 100).await?;

        let mut placed = Vec::new();

        for amount in 1..=3 {
            placed.push(helpers::place_order(&ctx, user, &[(sku.uuid, amount)]).await?);
        }

        helpers::place_order(&ctx, UserUuid::new(), &[(sku.uuid, 1)]).await?;

        let first = ctx
            .orders
            .list_orders(
                user,
                PageRequest {
                    page: 1,
                    per_page: 2,
                },
            )
            .await?;

        assert_eq!(first.total, 3);
        assert_eq!(first.last_page(), 2);

        let uuids: Vec<_> = first.items.iter().map(|order| order.uuid).collect();

        assert_eq!(
            uuids,
            vec![
                placed.get(2).map(|o| o.uuid).ok_or("missing order")?,
                placed.get(1).map(|o| o.uuid).ok_or("missing order")?,
            ]
        );
        assert!(first.items.iter().all(|order| order.items.len() == 1));

        let second = ctx
            .orders
            .list_orders(
                user,
                PageRequest {
                    page: 2,
                    per_page: 2,
                },
            )
            .await?;

        assert_eq!(second.items.len(), 1);
        assert_eq!(
            second.items.first().map(|order| order.uuid),
            placed.first().map(|order| order.uuid)
        );

        Ok(())
    }

    #[tokio::test]
    async fn get_order_hides_other_users_orders() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = UserUuid::new();
        let sku = helpers::create_sku(&ctx, 10, 10).await?;

        let order = helpers::place_order(&ctx, owner, &[(sku.uuid, 1)]).await?;

        let result = ctx.orders.get_order(UserUuid::new(), order.uuid).await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn pending_order_can_be_paid_once() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let sku = helpers::create_sku(&ctx, 10, 10).await?;

        let order = helpers::place_order(&ctx, user, &[(sku.uuid, 1)]).await?;

        let paid = ctx.orders.mark_paid(user, order.uuid).await?;

        assert_eq!(paid.status, OrderStatus::Paid);
        assert!(paid.paid_at.is_some());
        assert_eq!(paid.items.len(), 1);

        let again = ctx.orders.mark_paid(user, order.uuid).await;

        assert!(
            matches!(again, Err(OrdersServiceError::InvalidStatus(OrderStatus::Paid))),
            "expected InvalidStatus(Paid), got {again:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn closed_order_cannot_be_paid() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let sku = helpers::create_sku(&ctx, 10, 10).await?;

        let order = helpers::place_order(&ctx, user, &[(sku.uuid, 1)]).await?;

        ctx.cancellations.handle_expiry(order.uuid).await?;

        let result = ctx.orders.mark_paid(user, order.uuid).await;

        assert!(
            matches!(result, Err(OrdersServiceError::InvalidStatus(OrderStatus::Closed))),
            "expected InvalidStatus(Closed), got {result:?}"
        );

        Ok(())
    }
}
