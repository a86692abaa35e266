//! Product Records

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub title: String,
    pub description: String,
    pub on_sale: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// SKU UUID
pub type SkuUuid = TypedUuid<SkuRecord>;

/// SKU Record
///
/// `price` is read at placement time and copied into the order line; `stock`
/// only ever moves through the inventory ledger.
#[derive(Debug, Clone)]
pub struct SkuRecord {
    pub uuid: SkuUuid,
    pub product_uuid: ProductUuid,
    pub title: String,
    pub description: String,
    pub price: u64,
    pub stock: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}
