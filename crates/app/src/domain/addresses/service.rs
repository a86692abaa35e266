//! Addresses service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        addresses::{
            data::NewAddress,
            errors::AddressesServiceError,
            records::{AddressRecord, AddressUuid},
            repository::PgAddressesRepository,
        },
        users::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgAddressesService {
    db: Db,
    repository: PgAddressesRepository,
}

impl PgAddressesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgAddressesRepository::new(),
        }
    }
}

#[async_trait]
impl AddressesService for PgAddressesService {
    async fn create_address(
        &self,
        user: UserUuid,
        address: NewAddress,
    ) -> Result<AddressRecord, AddressesServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_address(&mut tx, user, address)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_address(
        &self,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<AddressRecord, AddressesServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.get_address(&mut tx, user, address).await?;

        tx.commit().await?;

        Ok(record)
    }
}

#[automock]
#[async_trait]
pub trait AddressesService: Send + Sync {
    /// Store a new address for the user.
    async fn create_address(
        &self,
        user: UserUuid,
        address: NewAddress,
    ) -> Result<AddressRecord, AddressesServiceError>;

    /// Retrieve one of the user's addresses.
    async fn get_address(
        &self,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<AddressRecord, AddressesServiceError>;
}
