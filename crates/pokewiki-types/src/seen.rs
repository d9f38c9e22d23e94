use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Encoded size, in bytes, past which a seen set is reset to empty.
pub const DEFAULT_SEEN_LIMIT: usize = 810;

/// Pokedex ids a player has already been shown, as `{ "<id>": true }`.
///
/// The set is not an LRU: once its JSON encoding grows past a byte limit it is
/// wiped wholesale (see [`SeenSet::bounded`]).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeenSet(BTreeMap<String, bool>);

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.0.get(&id.to_string()).copied().unwrap_or(false)
    }

    /// Mark `id` as seen. Returns `false` if it was already marked.
    pub fn mark(&mut self, id: u32) -> bool {
        self.0.insert(id.to_string(), true) != Some(true)
    }

    pub fn len(&self) -> usize {
        self.0.values().filter(|seen| **seen).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Ids currently marked, in ascending numeric order. Non-numeric keys are
    /// skipped.
    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .0
            .iter()
            .filter(|(_, seen)| **seen)
            .filter_map(|(key, _)| key.parse().ok())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Length of the JSON encoding in bytes.
    pub fn encoded_len(&self) -> Result<usize, TypeError> {
        serde_json::to_vec(self)
            .map(|bytes| bytes.len())
            .map_err(|e| TypeError::Serialization(e.to_string()))
    }

    /// Apply the overflow guard: an encoding longer than `limit` bytes yields
    /// an empty set, anything else is returned unchanged.
    pub fn bounded(self, limit: usize) -> Result<Self, TypeError> {
        if self.encoded_len()? > limit {
            Ok(Self::new())
        } else {
            Ok(self)
        }
    }
}
