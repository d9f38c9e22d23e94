use crate::error::{StoreError, StoreResult};

/// Bucketed key-value blob store.
///
/// All implementations must satisfy these invariants:
/// - `put` replaces the whole value at a key; there are no partial writes.
/// - `get` of a key that was never written returns `Ok(None)`.
/// - `list` returns every key in the bucket starting with `prefix`, sorted
///   ascending.
/// - No cross-key atomicity. Callers doing read-modify-write accept
///   last-writer-wins.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read the value at `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn get(&self, bucket: &str, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write (create or replace) the value at `key`.
    ///
    /// `content_type` is advisory metadata; backends may drop it.
    fn put(&self, bucket: &str, key: &str, data: &[u8], content_type: &str) -> StoreResult<()>;

    /// List keys in `bucket` that start with `prefix`, sorted ascending.
    ///
    /// Pass `""` to list the whole bucket.
    fn list(&self, bucket: &str, prefix: &str) -> StoreResult<Vec<String>>;

    /// Check whether a key exists.
    ///
    /// Default implementation reads the value. Backends may override with a
    /// cheaper metadata lookup.
    fn exists(&self, bucket: &str, key: &str) -> StoreResult<bool> {
        Ok(self.get(bucket, key)?.is_some())
    }

    /// Read several keys from one bucket.
    ///
    /// Default implementation calls `get()` for each key.
    fn get_batch(&self, bucket: &str, keys: &[String]) -> StoreResult<Vec<Option<Vec<u8>>>> {
        keys.iter().map(|key| self.get(bucket, key)).collect()
    }
}

/// Validate a bucket name: non-empty, no path separators, no traversal.
pub fn validate_bucket(bucket: &str) -> StoreResult<()> {
    if bucket.is_empty()
        || bucket.contains('/')
        || bucket.contains('\\')
        || bucket.contains('\0')
        || bucket == "."
        || bucket == ".."
    {
        return Err(StoreError::InvalidBucket(bucket.to_string()));
    }
    Ok(())
}

/// Validate an object key.
///
/// Keys are `/`-separated segments. A single trailing `/` is allowed so that
/// directory placeholders such as `pages/` can be represented.
pub fn validate_key(key: &str) -> StoreResult<()> {
    let invalid = |reason: &str| StoreError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if key.is_empty() {
        return Err(invalid("key must not be empty"));
    }
    if key.starts_with('/') {
        return Err(invalid("key must not be absolute"));
    }
    if key.contains('\0') || key.contains('\\') {
        return Err(invalid("key contains a forbidden character"));
    }

    let body = key.strip_suffix('/').unwrap_or(key);
    for segment in body.split('/') {
        match segment {
            "" => return Err(invalid("key contains an empty segment")),
            "." | ".." => return Err(invalid("key contains a relative segment")),
            _ => {}
        }
    }
    Ok(())
}
