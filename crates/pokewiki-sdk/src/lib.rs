//! High-level SDK for Pokewiki.
//!
//! [`Wiki`] wires the credential, page and game services over one object
//! store. This is the main entry point for the server and the CLI.

pub mod config;
pub mod error;
pub mod wiki;

pub use config::WikiConfig;
pub use error::{SdkError, SdkResult};
pub use wiki::Wiki;

// Re-export the types callers pass through the facade.
pub use pokewiki_game::{GameService, GuessOutcome};
pub use pokewiki_auth::{Account, CredentialStore};
pub use pokewiki_pages::{ImageUpload, PageStore};
pub use pokewiki_store::{FsObjectStore, InMemoryObjectStore, ObjectStore};
pub use pokewiki_types::{
    GameUser, LeaderboardEntry, PageFilter, PageRecord, PokedexEntry, SeenSet, SortDirection,
};
