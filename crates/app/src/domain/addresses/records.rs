//! Address Records

use jiff::Timestamp;

use crate::{domain::users::UserUuid, uuids::TypedUuid};

/// Address UUID
pub type AddressUuid = TypedUuid<AddressRecord>;

/// Address Record
#[derive(Debug, Clone)]
pub struct AddressRecord {
    pub uuid: AddressUuid,
    pub user_uuid: UserUuid,
    pub province: String,
    pub city: String,
    pub district: String,
    pub address: String,
    pub zip: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub last_used_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AddressRecord {
    /// Province, city, district and street joined into one line.
    pub fn full_address(&self) -> String {
        format!(
            "{}{}{}{}",
            self.province, self.city, self.district, self.address
        )
    }
}
