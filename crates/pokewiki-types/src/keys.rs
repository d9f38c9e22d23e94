//! Object store key layout.
//!
//! Keys are forward-slash namespaced strings inside a bucket. The content
//! bucket holds everything except password digests:
//!
//! - `pages/<lowercase-page-name>` for page records
//! - `images/<filename>` for uploaded page images
//! - `user_game_ranking/game_users/<username>` for [`GameUser`](crate::GameUser)
//! - `user_game_ranking/seen/<username>` for [`SeenSet`](crate::SeenSet)
//! - `user_game_ranking/pending/<username>` for the id awaiting a guess
//! - `user_game_ranking/ranks_list.json` for the [`Leaderboard`](crate::Leaderboard)
//! - `master_pokedex/...` for the static reference pokedex
//! - `filtering/categories.json` for filter option metadata
//!
//! The credentials bucket stores one digest per bare username key.

/// Default name of the bucket holding pages, images and game state.
pub const DEFAULT_CONTENT_BUCKET: &str = "wiki-content";

/// Default name of the bucket holding password digests.
pub const DEFAULT_CREDENTIALS_BUCKET: &str = "users-passwords";

/// Prefix for page records, including the trailing slash.
pub const PAGES_PREFIX: &str = "pages/";

/// Prefix for uploaded page images.
pub const IMAGES_PREFIX: &str = "images/";

/// Prefix for per-player game records.
pub const GAME_USERS_PREFIX: &str = "user_game_ranking/game_users/";

/// Prefix for per-player seen sets.
pub const SEEN_PREFIX: &str = "user_game_ranking/seen/";

/// Prefix for the pokedex id each player was last shown.
pub const PENDING_PREFIX: &str = "user_game_ranking/pending/";

/// The single leaderboard document.
pub const RANKS_LIST_KEY: &str = "user_game_ranking/ranks_list.json";

/// The reference pokedex, a JSON array indexed by `id - 1`.
pub const POKEDEX_KEY: &str = "master_pokedex/pokedex.json";

/// Prefix for reference pokedex images.
pub const POKEDEX_IMAGES_PREFIX: &str = "master_pokedex/images/";

/// The pokeball image shown while a pokemon is hidden.
pub const POKEBALL_KEY: &str = "master_pokedex/images/pokeball.png";

/// Filter option metadata for the page search form.
pub const CATEGORIES_KEY: &str = "filtering/categories.json";

/// Key of a page record. Page names are case-insensitive.
pub fn page_key(name: &str) -> String {
    format!("{PAGES_PREFIX}{}", name.to_lowercase())
}

/// Recover the page name from a page record key.
///
/// Returns `None` for keys outside the page namespace and for the namespace's
/// own directory placeholder.
pub fn page_name_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(PAGES_PREFIX).filter(|rest| !rest.is_empty())
}

/// Key of an uploaded image.
pub fn image_key(filename: &str) -> String {
    format!("{IMAGES_PREFIX}{filename}")
}

/// Key of a player's game record.
pub fn game_user_key(username: &str) -> String {
    format!("{GAME_USERS_PREFIX}{username}")
}

/// Key of a player's seen set.
pub fn seen_key(username: &str) -> String {
    format!("{SEEN_PREFIX}{username}")
}

/// Key of the pokedex id a player is expected to guess.
pub fn pending_key(username: &str) -> String {
    format!("{PENDING_PREFIX}{username}")
}

/// Key of a reference pokedex image, zero-padded to three digits.
pub fn pokedex_image_key(id: u32) -> String {
    format!("{POKEDEX_IMAGES_PREFIX}{id:03}.png")
}

/// Key of a password digest in the credentials bucket.
pub fn credential_key(username: &str) -> String {
    username.to_string()
}
