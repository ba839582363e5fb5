//! CBOR wire encoding shared by capsules and fragments.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{PreError, Result};

/// Serialize to CBOR bytes.
pub(crate) fn to_cbor<T: Serialize>(value: &T) -> Vec<u8> {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail for these plain structs.
    ciborium::into_writer(value, &mut buf).expect("CBOR serialization failed");
    buf
}

/// Deserialize from CBOR bytes.
pub(crate) fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    ciborium::from_reader(bytes).map_err(|e| PreError::Serialization(e.to_string()))
}

/// Decode a hex string into raw bytes.
pub(crate) fn from_hex(s: &str) -> Result<Vec<u8>> {
    hex::decode(s).map_err(|e| PreError::Serialization(e.to_string()))
}
