//! Typed Uuids

use std::{
    cmp::Ordering,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    hash::{Hash, Hasher},
    marker::PhantomData,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// A UUID tagged with the record type it identifies, so an order UUID can't be
/// passed where a SKU UUID is expected.
pub struct TypedUuid<T>(Uuid, PhantomData<fn() -> T>);

impl<T> TypedUuid<T> {
    /// Generate a new time-ordered (v7) identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::from_uuid(Uuid::now_v7())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, PhantomData)
    }

    #[must_use]
    pub const fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl<T> Default for TypedUuid<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TypedUuid<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedUuid<T> {}

impl<T> Debug for TypedUuid<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Debug::fmt(&self.0, f)
    }
}

impl<T> Display for TypedUuid<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl<T> PartialEq for TypedUuid<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for TypedUuid<T> {}

impl<T> Hash for TypedUuid<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> PartialOrd for TypedUuid<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for TypedUuid<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> From<Uuid> for TypedUuid<T> {
    fn from(value: Uuid) -> Self {
        Self::from_uuid(value)
    }
}

impl<T> From<TypedUuid<T>> for Uuid {
    fn from(value: TypedUuid<T>) -> Self {
        value.into_uuid()
    }
}

impl<T> Serialize for TypedUuid<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for TypedUuid<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Uuid::deserialize(deserializer).map(Self::from_uuid)
    }
}

/// Collect typed identifiers into plain UUIDs for binding as a `UUID[]` parameter.
pub(crate) fn to_uuids<T>(uuids: &[TypedUuid<T>]) -> Vec<Uuid> {
    uuids.iter().copied().map(TypedUuid::into_uuid).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    #[test]
    fn serializes_as_plain_uuid() -> Result<(), serde_json::Error> {
        let uuid = Uuid::now_v7();
        let typed = TypedUuid::<Marker>::from_uuid(uuid);

        assert_eq!(serde_json::to_string(&typed)?, format!("\"{uuid}\""));

        let decoded: TypedUuid<Marker> = serde_json::from_str(&format!("\"{uuid}\""))?;

        assert_eq!(decoded, typed);

        Ok(())
    }

    #[test]
    fn new_ids_are_time_ordered() {
        let first = TypedUuid::<Marker>::new();
        let second = TypedUuid::<Marker>::new();

        assert!(first < second, "v7 uuids should sort by creation time");
    }
}
