use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::traits::{validate_bucket, validate_key, ObjectStore};

/// Prefix of in-flight temporary files; never reported by `list`.
const TEMP_PREFIX: &str = ".tmp-pokewiki";

/// Filesystem object store.
///
/// Layout: `<root>/<bucket>/<key>`, where each `/`-separated key segment is a
/// directory level. Writes go to a temporary file in the target directory and
/// are renamed into place, so readers never observe a half-written value.
/// Content types are not persisted.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &str) -> StoreResult<PathBuf> {
        validate_bucket(bucket)?;
        Ok(self.root.join(bucket))
    }

    fn object_path(&self, bucket: &str, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        if key.ends_with('/') {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
                reason: "directory placeholders are implicit on the filesystem".into(),
            });
        }
        let mut path = self.bucket_dir(bucket)?;
        path.extend(key.split('/'));
        Ok(path)
    }
}

impl ObjectStore for FsObjectStore {
    fn get(&self, bucket: &str, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let path = self.object_path(bucket, key)?;
        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            // A key that names a directory (`pages` when `pages/abra` exists)
            // holds no value of its own.
            Err(_) if path.is_dir() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, bucket: &str, key: &str, data: &[u8], content_type: &str) -> StoreResult<()> {
        let path = self.object_path(bucket, key)?;
        let parent = path
            .parent()
            .ok_or_else(|| StoreError::Backend(format!("no parent directory for {key}")))?;
        fs::create_dir_all(parent)?;

        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(parent)?;
        temp.write_all(data)?;
        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(bucket, key, bytes = data.len(), content_type, "stored object");
        Ok(())
    }

    fn list(&self, bucket: &str, prefix: &str) -> StoreResult<Vec<String>> {
        let dir = self.bucket_dir(bucket)?;
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1) {
            let entry = entry.map_err(|e| StoreError::Backend(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.file_name().to_string_lossy().starts_with(TEMP_PREFIX) {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&dir)
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if key.starts_with(prefix) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn exists(&self, bucket: &str, key: &str) -> StoreResult<bool> {
        Ok(self.object_path(bucket, key)?.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUCKET: &str = "wiki-content";

    fn temp_store() -> (tempfile::TempDir, FsObjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::open(dir.path().join("store")).unwrap();
        (dir, store)
    }

    #[test]
    fn put_and_get() {
        let (_dir, store) = temp_store();
        store.put(BUCKET, "pages/abra", b"{}", "application/json").unwrap();
        assert_eq!(store.get(BUCKET, "pages/abra").unwrap().as_deref(), Some(&b"{}"[..]));
        assert!(store.root().join(BUCKET).join("pages").join("abra").is_file());
    }

    #[test]
    fn missing_key_is_none() {
        let (_dir, store) = temp_store();
        assert!(store.get(BUCKET, "pages/ghost").unwrap().is_none());
        assert!(!store.exists(BUCKET, "pages/ghost").unwrap());
    }

    #[test]
    fn directory_key_is_none() {
        let (_dir, store) = temp_store();
        store.put(BUCKET, "pages/abra", b"{}", "application/json").unwrap();
        assert!(store.get(BUCKET, "pages").unwrap().is_none());
        assert!(!store.exists(BUCKET, "pages").unwrap());
    }

    #[test]
    fn overwrite_replaces_value() {
        let (_dir, store) = temp_store();
        store.put(BUCKET, "k", b"a much longer first value", "text/plain").unwrap();
        store.put(BUCKET, "k", b"short", "text/plain").unwrap();
        assert_eq!(store.get(BUCKET, "k").unwrap().unwrap(), b"short");
    }

    #[test]
    fn list_walks_nested_keys() {
        let (_dir, store) = temp_store();
        store.put(BUCKET, "pages/zubat", b"{}", "application/json").unwrap();
        store.put(BUCKET, "pages/abra", b"{}", "application/json").unwrap();
        store.put(BUCKET, "user_game_ranking/seen/ash", b"{}", "application/json").unwrap();
        store.put(BUCKET, "user_game_ranking/ranks_list.json", b"{}", "application/json").unwrap();

        assert_eq!(store.list(BUCKET, "pages/").unwrap(), vec!["pages/abra", "pages/zubat"]);
        assert_eq!(
            store.list(BUCKET, "user_game_ranking/").unwrap(),
            vec!["user_game_ranking/ranks_list.json", "user_game_ranking/seen/ash"]
        );
        assert_eq!(store.list(BUCKET, "").unwrap().len(), 4);
    }

    #[test]
    fn list_missing_bucket_is_empty() {
        let (_dir, store) = temp_store();
        assert!(store.list("users-passwords", "").unwrap().is_empty());
    }

    #[test]
    fn traversal_is_rejected() {
        let (_dir, store) = temp_store();
        assert!(matches!(
            store.put(BUCKET, "../outside", b"x", "text/plain"),
            Err(StoreError::InvalidKey { .. })
        ));
        assert!(matches!(
            store.put("..", "k", b"x", "text/plain"),
            Err(StoreError::InvalidBucket(_))
        ));
    }

    #[test]
    fn placeholders_are_rejected() {
        let (_dir, store) = temp_store();
        assert!(matches!(
            store.put(BUCKET, "pages/", b"", "application/x-directory"),
            Err(StoreError::InvalidKey { .. })
        ));
    }

    #[test]
    fn reopen_sees_previous_writes() {
        let (dir, store) = temp_store();
        store.put("users-passwords", "ash", b"digest", "text/plain").unwrap();
        drop(store);

        let reopened = FsObjectStore::open(dir.path().join("store")).unwrap();
        assert_eq!(reopened.get("users-passwords", "ash").unwrap().unwrap(), b"digest");
    }
}
