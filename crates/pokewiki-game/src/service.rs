use std::sync::{Arc, Mutex};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use pokewiki_store::{ObjectStore, ObjectStoreExt};
use pokewiki_types::{
    keys, GameUser, Leaderboard, LeaderboardEntry, PokedexEntry, SeenSet, DEFAULT_SEEN_LIMIT,
};

use crate::engine::{apply_score_update, check_leaderboard};
use crate::error::{GameError, GameResult};

/// Points awarded for naming the hidden pokemon.
pub const CORRECT_GUESS_POINTS: i64 = 100;

/// Points deducted for a wrong guess.
pub const WRONG_GUESS_POINTS: i64 = -50;

/// Storage settings for the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Bucket holding game records, the leaderboard and the pokedex.
    pub bucket: String,
    /// Encoded size past which a seen set is reset.
    pub seen_limit: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            bucket: keys::DEFAULT_CONTENT_BUCKET.into(),
            seen_limit: DEFAULT_SEEN_LIMIT,
        }
    }
}

/// Result of one guess.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GuessOutcome {
    pub correct: bool,
    /// The pokemon's real name.
    pub answer: String,
    /// Points added (or removed) by this guess.
    pub delta: i64,
    /// The player's entry after the leaderboard repair.
    pub player: GameUser,
}

/// Game records, leaderboard and pokedex access over an [`ObjectStore`].
///
/// Holds no game state between calls: every operation re-reads what it needs
/// and writes whole records back. Leaderboard read-modify-write cycles are
/// serialized within this process; writers in other processes still race
/// with last-writer-wins.
pub struct GameService {
    store: Arc<dyn ObjectStore>,
    config: GameConfig,
    leaderboard_lock: Mutex<()>,
}

impl GameService {
    pub fn new(store: Arc<dyn ObjectStore>, config: GameConfig) -> Self {
        Self {
            store,
            config,
            leaderboard_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    fn bucket(&self) -> &str {
        &self.config.bucket
    }

    // ---- Players ----

    /// Write a fresh unranked game record and an empty seen set.
    pub fn provision_player(&self, username: &str) -> GameResult<GameUser> {
        let user = GameUser::unranked(username);
        self.store
            .put_json(self.bucket(), &keys::game_user_key(username), &user)?;
        self.store
            .put_json(self.bucket(), &keys::seen_key(username), &SeenSet::new())?;
        debug!(player = username, "provisioned game records");
        Ok(user)
    }

    pub fn game_user(&self, username: &str) -> GameResult<Option<GameUser>> {
        Ok(self
            .store
            .get_json(self.bucket(), &keys::game_user_key(username))?)
    }

    // ---- Leaderboard ----

    /// The full leaderboard in rank order. A leaderboard that was never
    /// written is empty.
    pub fn leaderboard(&self) -> GameResult<Vec<LeaderboardEntry>> {
        let board: Option<Leaderboard> = self.store.get_json(self.bucket(), keys::RANKS_LIST_KEY)?;
        Ok(board.map(Leaderboard::into_entries).unwrap_or_default())
    }

    /// Check the stored leaderboard against the ranking invariants.
    pub fn verify_leaderboard(&self) -> GameResult<usize> {
        let list = self.leaderboard()?;
        check_leaderboard(&list)?;
        Ok(list.len())
    }

    /// Repair the stored leaderboard for one player's new points and write
    /// the whole list back. Returns the player's corrected entry; the
    /// player's own record is not written.
    pub fn update_leaderboard(&self, updated: GameUser) -> GameResult<GameUser> {
        let _guard = self
            .leaderboard_lock
            .lock()
            .map_err(|_| GameError::LockPoisoned)?;
        self.update_leaderboard_locked(updated)
    }

    fn update_leaderboard_locked(&self, updated: GameUser) -> GameResult<GameUser> {
        let list = self.leaderboard()?;
        if let Err(violation) = check_leaderboard(&list) {
            warn!(%violation, "updating an inconsistent leaderboard");
        }

        let previous_rank = updated.rank;
        let (list, corrected) = apply_score_update(list, updated);
        self.store
            .put_json(self.bucket(), keys::RANKS_LIST_KEY, &Leaderboard::new(list))?;

        info!(
            player = %corrected.name,
            points = corrected.points,
            from_rank = ?previous_rank,
            to_rank = ?corrected.rank,
            "leaderboard updated"
        );
        Ok(corrected)
    }

    /// Set a player's point total, repair the leaderboard, and store the
    /// corrected player record.
    ///
    /// Writes the leaderboard first and the player record second. A failure
    /// between the two leaves them out of step; nothing compensates.
    pub fn update_points(&self, username: &str, new_total: i64) -> GameResult<GameUser> {
        let _guard = self
            .leaderboard_lock
            .lock()
            .map_err(|_| GameError::LockPoisoned)?;
        let mut user = self.require_user(username)?;
        user.points = new_total;
        self.store_points(user)
    }

    /// Add `delta` (possibly negative) to a player's point total.
    pub fn add_points(&self, username: &str, delta: i64) -> GameResult<GameUser> {
        let _guard = self
            .leaderboard_lock
            .lock()
            .map_err(|_| GameError::LockPoisoned)?;
        let mut user = self.require_user(username)?;
        user.points = user.points.saturating_add(delta);
        self.store_points(user)
    }

    fn require_user(&self, username: &str) -> GameResult<GameUser> {
        self.game_user(username)?
            .ok_or_else(|| GameError::UnknownPlayer(username.to_string()))
    }

    fn store_points(&self, user: GameUser) -> GameResult<GameUser> {
        let key = keys::game_user_key(&user.name);
        let corrected = self.update_leaderboard_locked(user)?;
        self.store.put_json(self.bucket(), &key, &corrected)?;
        Ok(corrected)
    }

    // ---- Seen sets ----

    /// Pokedex ids the player has been shown. Missing sets are empty.
    pub fn seen(&self, username: &str) -> GameResult<SeenSet> {
        let seen: Option<SeenSet> = self.store.get_json(self.bucket(), &keys::seen_key(username))?;
        Ok(seen.unwrap_or_default())
    }

    /// Overwrite the player's seen set, resetting it to empty if its encoding
    /// exceeds the configured limit. Returns what was stored.
    pub fn update_seen(&self, username: &str, seen: SeenSet) -> GameResult<SeenSet> {
        let before = seen.len();
        let stored = seen.bounded(self.config.seen_limit)?;
        if stored.len() != before {
            debug!(player = username, dropped = before, "seen set overflowed, reset");
        }
        self.store
            .put_json(self.bucket(), &keys::seen_key(username), &stored)?;
        Ok(stored)
    }

    // ---- Pokedex ----

    /// The whole reference pokedex. Missing pokedex is empty.
    pub fn pokedex(&self) -> GameResult<Vec<PokedexEntry>> {
        let pokedex: Option<Vec<PokedexEntry>> = self.store.get_json(self.bucket(), keys::POKEDEX_KEY)?;
        Ok(pokedex.unwrap_or_default())
    }

    /// Pokedex entry by 1-based id.
    pub fn pokedex_entry(&self, id: u32) -> GameResult<Option<PokedexEntry>> {
        let index = match (id as usize).checked_sub(1) {
            Some(index) => index,
            None => return Ok(None),
        };
        Ok(self.pokedex()?.into_iter().nth(index))
    }

    /// Base64 of `master_pokedex/images/<id>.png`.
    pub fn pokemon_image(&self, id: u32) -> GameResult<Option<String>> {
        Ok(self.store.get_base64(self.bucket(), &keys::pokedex_image_key(id))?)
    }

    /// Base64 of the pokeball placeholder image.
    pub fn pokeball_image(&self) -> GameResult<Option<String>> {
        Ok(self.store.get_base64(self.bucket(), keys::POKEBALL_KEY)?)
    }

    // ---- Guessing game ----

    /// Pick a pokedex id the player has not been shown, mark it seen and
    /// record it as the one awaiting the player's guess.
    ///
    /// Once every id has been shown the seen set starts over. Returns `None`
    /// when there is no pokedex.
    pub fn next_pokemon(&self, username: &str) -> GameResult<Option<u32>> {
        self.next_pokemon_with(username, &mut rand::thread_rng())
    }

    pub fn next_pokemon_with<R: Rng + ?Sized>(
        &self,
        username: &str,
        rng: &mut R,
    ) -> GameResult<Option<u32>> {
        let total = u32::try_from(self.pokedex()?.len()).unwrap_or(u32::MAX);
        if total == 0 {
            return Ok(None);
        }

        let mut seen = self.seen(username)?;
        let mut unseen: Vec<u32> = (1..=total).filter(|id| !seen.contains(*id)).collect();
        if unseen.is_empty() {
            seen.clear();
            unseen = (1..=total).collect();
        }

        let Some(&id) = unseen.choose(rng) else {
            return Ok(None);
        };
        seen.mark(id);
        self.update_seen(username, seen)?;
        self.store
            .put_json(self.bucket(), &keys::pending_key(username), &Some(id))?;
        Ok(Some(id))
    }

    /// The id last served by [`next_pokemon`](Self::next_pokemon) and not
    /// yet guessed.
    pub fn pending_pokemon(&self, username: &str) -> GameResult<Option<u32>> {
        let pending: Option<Option<u32>> = self
            .store
            .get_json(self.bucket(), &keys::pending_key(username))?;
        Ok(pending.flatten())
    }

    /// Score a guess for pokedex entry `id`: +100 when the name matches
    /// (case-insensitive), -50 otherwise.
    ///
    /// Only the id last served to the player can be scored, once. The pending
    /// id is cleared before the points are written.
    pub fn submit_guess(&self, username: &str, id: u32, guess: &str) -> GameResult<GuessOutcome> {
        let entry = self
            .pokedex_entry(id)?
            .ok_or(GameError::UnknownPokemon(id))?;

        let _guard = self
            .leaderboard_lock
            .lock()
            .map_err(|_| GameError::LockPoisoned)?;
        if self.pending_pokemon(username)? != Some(id) {
            debug!(player = username, pokemon = id, "guess rejected, not served");
            return Err(GameError::NotServed(id));
        }
        let mut user = self.require_user(username)?;
        self.store
            .put_json(self.bucket(), &keys::pending_key(username), &None::<u32>)?;

        let correct = entry.is_named(guess);
        let delta = if correct {
            CORRECT_GUESS_POINTS
        } else {
            WRONG_GUESS_POINTS
        };
        user.points = user.points.saturating_add(delta);
        let player = self.store_points(user)?;
        debug!(player = username, pokemon = id, correct, "guess scored");
        Ok(GuessOutcome {
            correct,
            answer: entry.name,
            delta,
            player,
        })
    }
}

impl std::fmt::Debug for GameService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
