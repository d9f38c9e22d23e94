use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One creature in the reference pokedex (`master_pokedex/pokedex.json`).
///
/// The pokedex is a JSON array where entry `id` sits at index `id - 1`.
/// Only `name` is interpreted; everything else is passed through.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokedexEntry {
    pub name: String,
    #[serde(flatten)]
    pub details: BTreeMap<String, Value>,
}

impl PokedexEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            details: BTreeMap::new(),
        }
    }

    /// Case-insensitive comparison against a player's guess. Surrounding
    /// whitespace in the guess is ignored.
    pub fn is_named(&self, guess: &str) -> bool {
        self.name.to_lowercase() == guess.trim().to_lowercase()
    }
}
