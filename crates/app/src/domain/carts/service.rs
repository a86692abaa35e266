//! Carts service.

use async_trait::async_trait;
use mockall::automock;
use tracing::debug;

use crate::{
    database::Db,
    domain::{
        carts::{
            data::NewCartItem, errors::CartsServiceError, records::CartItemRecord,
            repository::PgCartItemsRepository,
        },
        products::records::SkuUuid,
        users::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    items_repository: PgCartItemsRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            items_repository: PgCartItemsRepository::new(),
        }
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    #[tracing::instrument(
        name = "carts.service.add_to_cart",
        skip(self, item),
        fields(
            user_uuid = %user,
            sku_uuid = %item.sku_uuid,
            amount = item.amount,
            line_amount = tracing::field::Empty
        ),
        err
    )]
    async fn add_to_cart(
        &self,
        user: UserUuid,
        item: NewCartItem,
    ) -> Result<CartItemRecord, CartsServiceError> {
        if item.amount == 0 {
            return Err(CartsServiceError::InvalidInput("amount must be positive"));
        }

        let mut tx = self.db.begin().await?;

        let line = self
            .items_repository
            .upsert_item(&mut tx, user, item.sku_uuid, item.amount)
            .await?;

        tx.commit().await?;

        tracing::Span::current().record("line_amount", line.amount);

        debug!(line_amount = line.amount, "merged cart line");

        Ok(line)
    }

    async fn list_items(&self, user: UserUuid) -> Result<Vec<CartItemRecord>, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let items = self.items_repository.list_items(&mut tx, user).await?;

        tx.commit().await?;

        Ok(items)
    }

    async fn remove_item(&self, user: UserUuid, sku: SkuUuid) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.items_repository.delete_item(&mut tx, user, sku).await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Add `item.amount` of the SKU to the user's cart, merging into an
    /// existing line for the same SKU.
    async fn add_to_cart(
        &self,
        user: UserUuid,
        item: NewCartItem,
    ) -> Result<CartItemRecord, CartsServiceError>;

    /// The user's cart lines, newest first.
    async fn list_items(&self, user: UserUuid) -> Result<Vec<CartItemRecord>, CartsServiceError>;

    /// Remove the user's line for the given SKU.
    async fn remove_item(&self, user: UserUuid, sku: SkuUuid) -> Result<(), CartsServiceError>;
}
