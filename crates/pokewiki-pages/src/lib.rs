//! Page and image storage for Pokewiki.
//!
//! Pages are immutable JSON records under `pages/<lowercase name>`; their
//! images live under `images/<filename>`. Queries are linear scans over the
//! page namespace -- there is no index.

pub mod error;
pub mod store;

pub use error::{PageError, PageResult};
pub use store::{ImageUpload, PageStore, PagesConfig};
