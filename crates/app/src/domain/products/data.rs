//! Products Data

use crate::domain::products::records::{ProductUuid, SkuUuid};

/// New Product Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub title: String,
    pub description: String,
    pub on_sale: bool,
}

/// New SKU Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewSku {
    pub uuid: SkuUuid,
    pub product_uuid: ProductUuid,
    pub title: String,
    pub description: String,

    /// Unit price in minor currency units.
    pub price: u64,

    /// Opening stock level.
    pub stock: u64,
}
