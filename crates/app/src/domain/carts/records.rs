//! Cart Records

use jiff::Timestamp;

use crate::{
    domain::{products::records::SkuUuid, users::UserUuid},
    uuids::TypedUuid,
};

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItemRecord>;

/// CartItem Record
#[derive(Debug, Clone)]
pub struct CartItemRecord {
    pub uuid: CartItemUuid,
    pub user_uuid: UserUuid,
    pub sku_uuid: SkuUuid,
    pub amount: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
