//! Error types for credential operations.

use thiserror::Error;

/// Errors that can occur during credential operations.
///
/// A duplicate sign-up or a failed sign-in is not an error: those are
/// reported as `Ok(false)`.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The username cannot be used as a storage key.
    #[error(transparent)]
    InvalidUsername(#[from] pokewiki_types::TypeError),

    /// Provisioning the new user's game records failed.
    #[error("game provisioning failed: {0}")]
    Game(#[from] pokewiki_game::GameError),

    /// The credential store could not be reached or returned garbage.
    #[error("store error: {0}")]
    Store(#[from] pokewiki_store::StoreError),
}

/// Convenience type alias for credential operations.
pub type AuthResult<T> = Result<T, AuthError>;
