//! Leaderboard ranking and the pokedex guessing game.
//!
//! The leaderboard is a single ordered list persisted as one JSON document.
//! [`apply_score_update`] repairs that list after one player's points change,
//! moving the player one slot at a time until ranks and points agree again.
//! [`GameService`] wraps the engine with the storage round trip: read the
//! whole list, repair it in memory, write the whole list back, then write the
//! player's own record.
//!
//! # Invariants
//!
//! After every update the list is in ascending rank order and ranks are
//! exactly `1..=len`. Points are non-increasing down the list, except that a
//! player's first update appends them at the bottom; their next update
//! settles them, whether it raises or lowers their points. Equal points keep their existing relative order.

pub mod engine;
pub mod error;
pub mod service;

pub use engine::{apply_score_update, check_leaderboard, LeaderboardViolation};
pub use error::{GameError, GameResult};
pub use service::{GameConfig, GameService, GuessOutcome, CORRECT_GUESS_POINTS, WRONG_GUESS_POINTS};
