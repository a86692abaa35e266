//! Cart Data

use crate::domain::products::records::SkuUuid;

/// New Cart Item Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartItem {
    pub sku_uuid: SkuUuid,
    pub amount: u32,
}
