//! Order Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    domain::{
        addresses::records::AddressRecord,
        products::records::{ProductUuid, SkuUuid},
        users::UserUuid,
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItemRecord>;

/// Order lifecycle state.
///
/// `Pending` is the only state an order ever leaves; `Paid` and `Closed` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Paid,
    Closed,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown order status `{0}`")]
pub struct UnknownOrderStatus(String);

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "closed" => Ok(Self::Closed),
            other => Err(UnknownOrderStatus(other.to_string())),
        }
    }
}

/// Delivery details copied from the user's address when the order is placed.
///
/// Later edits to the address record never reach an existing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSnapshot {
    pub address: String,
    pub zip: String,
    pub contact_name: String,
    pub contact_phone: String,
}

impl From<&AddressRecord> for AddressSnapshot {
    fn from(record: &AddressRecord) -> Self {
        Self {
            address: record.full_address(),
            zip: record.zip.clone(),
            contact_name: record.contact_name.clone(),
            contact_phone: record.contact_phone.clone(),
        }
    }
}

/// Order Record
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub user_uuid: UserUuid,
    pub address: AddressSnapshot,
    pub remark: Option<String>,

    /// Sum of `price * amount` over `items`, fixed at placement.
    pub total_amount: u64,

    pub status: OrderStatus,
    pub items: Vec<OrderItemRecord>,
    pub paid_at: Option<Timestamp>,
    pub closed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Order Item Record
#[derive(Debug, Clone)]
pub struct OrderItemRecord {
    pub uuid: OrderItemUuid,
    pub order_uuid: OrderUuid,
    pub product_uuid: ProductUuid,
    pub sku_uuid: SkuUuid,

    /// SKU price at the moment the order was placed.
    pub price: u64,

    pub amount: u32,
    pub created_at: Timestamp,
}

/// One page of a user's orders.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> Page<T> {
    /// Number of the last non-empty page, or 1 when there are no rows.
    pub fn last_page(&self) -> u64 {
        self.total.div_ceil(u64::from(self.per_page.max(1))).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_its_column_value() {
        for status in [OrderStatus::Pending, OrderStatus::Paid, OrderStatus::Closed] {
            assert_eq!(status.as_str().parse::<OrderStatus>().ok(), Some(status));
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("refunded".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn last_page_rounds_up() {
        let page = Page::<()> {
            items: Vec::new(),
            page: 1,
            per_page: 15,
            total: 31,
        };

        assert_eq!(page.last_page(), 3);
    }

    #[test]
    fn last_page_of_empty_result_is_one() {
        let page = Page::<()> {
            items: Vec::new(),
            page: 1,
            per_page: 15,
            total: 0,
        };

        assert_eq!(page.last_page(), 1);
    }
}
