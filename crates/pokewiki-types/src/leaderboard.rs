use serde::{Deserialize, Serialize};

/// One row of the leaderboard.
///
/// `rank` is 1-based with 1 the highest score. `None` means the player has
/// not been placed yet: freshly signed-up players carry `None` until their
/// first score update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub points: i64,
    pub rank: Option<u32>,
}

/// A player's own game record, stored under
/// `user_game_ranking/game_users/<name>`.
///
/// It is a denormalized copy of the player's [`LeaderboardEntry`] and is only
/// ever rewritten by a score update.
pub type GameUser = LeaderboardEntry;

impl LeaderboardEntry {
    pub fn new(name: impl Into<String>, points: i64, rank: Option<u32>) -> Self {
        Self {
            name: name.into(),
            points,
            rank,
        }
    }

    /// A player as provisioned at sign-up: no points, not yet ranked.
    pub fn unranked(name: impl Into<String>) -> Self {
        Self::new(name, 0, None)
    }
}

/// The persisted leaderboard document: `{ "ranks_list": [...] }`.
///
/// Entries are kept in ascending rank order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub ranks_list: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new(ranks_list: Vec<LeaderboardEntry>) -> Self {
        Self { ranks_list }
    }

    pub fn len(&self) -> usize {
        self.ranks_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks_list.is_empty()
    }

    pub fn into_entries(self) -> Vec<LeaderboardEntry> {
        self.ranks_list
    }
}

impl From<Vec<LeaderboardEntry>> for Leaderboard {
    fn from(ranks_list: Vec<LeaderboardEntry>) -> Self {
        Self { ranks_list }
    }
}
