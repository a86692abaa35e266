//! Users
//!
//! Users are owned by the authentication layer. The ordering core only ever
//! receives an explicit user identity and scopes rows by it.

use crate::uuids::TypedUuid;

/// Marker for identifiers issued by the authentication layer.
#[derive(Debug)]
pub struct UserRecord;

/// User UUID
pub type UserUuid = TypedUuid<UserRecord>;
