//! Order Data

use rustc_hash::FxHashSet;

use crate::domain::{
    addresses::records::AddressUuid, orders::errors::OrdersServiceError,
    products::records::SkuUuid,
};

/// Default number of orders per page.
pub const DEFAULT_PER_PAGE: u32 = 15;

/// Largest page size a caller may request.
pub const MAX_PER_PAGE: u32 = 100;

/// New Order Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub address_uuid: AddressUuid,
    pub remark: Option<String>,

    /// Requested lines, processed in this order.
    pub items: Vec<NewOrderItem>,
}

/// New Order Item Data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderItem {
    pub sku_uuid: SkuUuid,
    pub amount: u32,
}

impl NewOrder {
    /// Reject requests that can't be placed, before any transaction is opened.
    ///
    /// # Errors
    ///
    /// Returns [`OrdersServiceError::InvalidInput`] for an empty item list, a
    /// zero amount, or a SKU listed more than once.
    pub fn validate(&self) -> Result<(), OrdersServiceError> {
        if self.items.is_empty() {
            return Err(OrdersServiceError::InvalidInput(
                "order must contain at least one item",
            ));
        }

        let mut seen = FxHashSet::default();

        for item in &self.items {
            if item.amount == 0 {
                return Err(OrdersServiceError::InvalidInput(
                    "item amount must be positive",
                ));
            }

            if !seen.insert(item.sku_uuid) {
                return Err(OrdersServiceError::InvalidInput(
                    "sku listed more than once",
                ));
            }
        }

        Ok(())
    }
}

/// Page Request Data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Clamp to a valid page: page 0 becomes 1; `per_page` is kept within
    /// `1..=MAX_PER_PAGE`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }
}
