/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The key cannot be stored safely (empty, traversal, absolute, ...).
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// The bucket name is empty or contains a separator.
    #[error("invalid bucket {0:?}")]
    InvalidBucket(String),

    /// A stored value could not be encoded or decoded.
    #[error("serialization error at {key}: {reason}")]
    Serialization { key: String, reason: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other backend failure (poisoned lock, remote error, ...).
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
