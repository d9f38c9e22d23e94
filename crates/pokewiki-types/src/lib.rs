//! Foundation types for Pokewiki.
//!
//! Every record Pokewiki persists lives in a bucketed object store as a JSON
//! document. This crate defines those documents and the key layout they are
//! stored under. Every other Pokewiki crate depends on `pokewiki-types`.
//!
//! # Key Types
//!
//! - [`LeaderboardEntry`] / [`GameUser`]: a player's name, points and rank
//! - [`Leaderboard`]: the persisted `{ "ranks_list": [...] }` document
//! - [`SeenSet`]: per-player record of already-presented pokedex ids
//! - [`PageRecord`]: a user-submitted wiki page
//! - [`PageFilter`] / [`SortDirection`]: page query parameters
//! - [`PokedexEntry`]: one row of the static reference pokedex
//!
//! Key builders live in [`keys`]; name validation in [`names`].

pub mod error;
pub mod keys;
pub mod leaderboard;
pub mod names;
pub mod page;
pub mod pokedex;
pub mod seen;

pub use error::TypeError;
pub use leaderboard::{GameUser, Leaderboard, LeaderboardEntry};
pub use names::{validate_page_name, validate_username};
pub use page::{PageFilter, PageRecord, SortDirection};
pub use pokedex::PokedexEntry;
pub use seen::{SeenSet, DEFAULT_SEEN_LIMIT};
