//! Address Data

use crate::domain::addresses::records::AddressUuid;

/// New Address Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewAddress {
    pub uuid: AddressUuid,
    pub province: String,
    pub city: String,
    pub district: String,
    pub address: String,
    pub zip: String,
    pub contact_name: String,
    pub contact_phone: String,
}
