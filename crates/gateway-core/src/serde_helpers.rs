//! Serde helpers for gateway types.

use alloy_primitives::Address;
use serde::{Deserialize, Deserializer, Serializer};

/// (De)serializes an [`Address`] as an EIP-55 checksummed hex string.
///
/// Deserialization accepts any casing.
pub mod checksum {
    use super::*;

    pub fn serialize<S: Serializer>(addr: &Address, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&addr.to_checksum(None))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
        Address::deserialize(deserializer)
    }
}

/// Same as [`checksum`] for an optional address, `None` being `null`.
pub mod checksum_opt {
    use super::*;

    pub fn serialize<S: Serializer>(
        addr: &Option<Address>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match addr {
            Some(addr) => serializer.serialize_some(&addr.to_checksum(None)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Address>, D::Error> {
        Option::<Address>::deserialize(deserializer)
    }
}
