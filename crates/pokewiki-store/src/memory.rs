use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::error::{StoreError, StoreResult};
use crate::traits::{validate_bucket, validate_key, ObjectStore};

#[derive(Clone, Debug)]
struct StoredBlob {
    data: Vec<u8>,
    content_type: String,
}

type Buckets = BTreeMap<String, BTreeMap<String, StoredBlob>>;

/// In-memory, `BTreeMap`-based object store.
///
/// Intended for tests and embedding. All values are held in memory behind a
/// `RwLock` for safe concurrent access and are cloned on read/write. Keys
/// stay sorted, so `list` needs no extra sort.
pub struct InMemoryObjectStore {
    buckets: RwLock<Buckets>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            buckets: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of values currently stored across all buckets.
    pub fn len(&self) -> usize {
        let buckets = self.buckets.read().unwrap_or_else(PoisonError::into_inner);
        buckets.values().map(BTreeMap::len).sum()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content type recorded for a key, if the key exists.
    pub fn content_type(&self, bucket: &str, key: &str) -> Option<String> {
        let buckets = self.buckets.read().unwrap_or_else(PoisonError::into_inner);
        buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .map(|blob| blob.content_type.clone())
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::Backend("lock poisoned".into())
}

impl ObjectStore for InMemoryObjectStore {
    fn get(&self, bucket: &str, key: &str) -> StoreResult<Option<Vec<u8>>> {
        validate_bucket(bucket)?;
        validate_key(key)?;
        let buckets = self.buckets.read().map_err(poisoned)?;
        Ok(buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .map(|blob| blob.data.clone()))
    }

    fn put(&self, bucket: &str, key: &str, data: &[u8], content_type: &str) -> StoreResult<()> {
        validate_bucket(bucket)?;
        validate_key(key)?;
        let mut buckets = self.buckets.write().map_err(poisoned)?;
        buckets.entry(bucket.to_string()).or_default().insert(
            key.to_string(),
            StoredBlob {
                data: data.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn list(&self, bucket: &str, prefix: &str) -> StoreResult<Vec<String>> {
        validate_bucket(bucket)?;
        let buckets = self.buckets.read().map_err(poisoned)?;
        let Some(objects) = buckets.get(bucket) else {
            return Ok(Vec::new());
        };
        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }

    fn exists(&self, bucket: &str, key: &str) -> StoreResult<bool> {
        validate_bucket(bucket)?;
        validate_key(key)?;
        let buckets = self.buckets.read().map_err(poisoned)?;
        Ok(buckets
            .get(bucket)
            .is_some_and(|objects| objects.contains_key(key)))
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &count)
            .finish()
    }
}
