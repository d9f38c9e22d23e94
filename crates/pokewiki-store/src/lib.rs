//! Bucketed object storage for Pokewiki.
//!
//! Every piece of Pokewiki state -- pages, images, password digests, game
//! records and the leaderboard -- is a whole-value blob addressed by a
//! `(bucket, key)` pair. Keys are forward-slash namespaced strings
//! (`pages/abra`, `user_game_ranking/ranks_list.json`).
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `BTreeMap`-based store for tests and embedding
//! - [`FsObjectStore`] -- one file per key under a root directory
//!
//! # Design Rules
//!
//! 1. Values are read and written whole. There are no partial updates.
//! 2. No transactions: a multi-key sequence can stop half way on error.
//! 3. Missing keys are `Ok(None)`, never an error.
//! 4. The store never interprets values; JSON handling lives in [`codec`].
//! 5. All I/O errors are propagated, never silently ignored.

pub mod codec;
pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use codec::ObjectStoreExt;
pub use error::{StoreError, StoreResult};
pub use fs::FsObjectStore;
pub use memory::InMemoryObjectStore;
pub use traits::{validate_bucket, validate_key, ObjectStore};
