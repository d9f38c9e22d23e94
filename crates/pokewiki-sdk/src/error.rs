use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("hasher error: {0}")]
    Hasher(#[from] pokewiki_crypto::HasherError),

    #[error("store error: {0}")]
    Store(#[from] pokewiki_store::StoreError),

    #[error(transparent)]
    Auth(#[from] pokewiki_auth::AuthError),

    #[error(transparent)]
    Game(#[from] pokewiki_game::GameError),

    #[error(transparent)]
    Pages(#[from] pokewiki_pages::PageError),
}

pub type SdkResult<T> = Result<T, SdkError>;
