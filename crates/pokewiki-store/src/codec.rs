//! JSON record codec over any [`ObjectStore`].
//!
//! Records are plain JSON documents with no schema version. Text values
//! (password digests) are stored as raw UTF-8. Image bytes are stored raw and
//! handed to callers as standard base64 text.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// Content type recorded for JSON records.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Content type recorded for raw text values.
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

/// Typed read/write helpers, available on every [`ObjectStore`] including
/// `dyn ObjectStore`.
pub trait ObjectStoreExt: ObjectStore {
    /// Read and decode a JSON record. Missing keys are `Ok(None)`; a value
    /// that does not decode is an error.
    fn get_json<T: DeserializeOwned>(&self, bucket: &str, key: &str) -> StoreResult<Option<T>> {
        match self.get(bucket, key)? {
            Some(bytes) => decode_json(key, &bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Encode and write a JSON record, replacing any previous value.
    fn put_json<T: Serialize + ?Sized>(&self, bucket: &str, key: &str, value: &T) -> StoreResult<()> {
        let bytes = encode_json(key, value)?;
        self.put(bucket, key, &bytes, JSON_CONTENT_TYPE)
    }

    /// Read a UTF-8 text value.
    fn get_text(&self, bucket: &str, key: &str) -> StoreResult<Option<String>> {
        match self.get(bucket, key)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| StoreError::Serialization {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    /// Write a UTF-8 text value.
    fn put_text(&self, bucket: &str, key: &str, text: &str) -> StoreResult<()> {
        self.put(bucket, key, text.as_bytes(), TEXT_CONTENT_TYPE)
    }

    /// Read raw bytes and return them base64-encoded.
    fn get_base64(&self, bucket: &str, key: &str) -> StoreResult<Option<String>> {
        Ok(self.get(bucket, key)?.map(|bytes| STANDARD.encode(bytes)))
    }
}

impl<S: ObjectStore + ?Sized> ObjectStoreExt for S {}

/// Decode a JSON value read from `key`.
pub fn decode_json<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> StoreResult<T> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Serialization {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Encode a value for storage at `key`.
pub fn encode_json<T: Serialize + ?Sized>(key: &str, value: &T) -> StoreResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| StoreError::Serialization {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
