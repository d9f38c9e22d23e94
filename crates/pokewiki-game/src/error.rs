use thiserror::Error;

use crate::engine::LeaderboardViolation;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("no game record for player: {0}")]
    UnknownPlayer(String),

    #[error("no pokedex entry with id {0}")]
    UnknownPokemon(u32),

    #[error("pokemon {0} is not awaiting a guess")]
    NotServed(u32),

    #[error("stored leaderboard is inconsistent: {0}")]
    InconsistentLeaderboard(#[from] LeaderboardViolation),

    #[error("leaderboard lock poisoned")]
    LockPoisoned,

    #[error("invalid record: {0}")]
    Type(#[from] pokewiki_types::TypeError),

    #[error("store error: {0}")]
    Store(#[from] pokewiki_store::StoreError),
}

pub type GameResult<T> = Result<T, GameError>;
