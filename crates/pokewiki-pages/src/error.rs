use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    InvalidPageName(#[from] pokewiki_types::TypeError),

    #[error("invalid image file name {0:?}")]
    InvalidImageName(String),

    #[error("an image is already stored at {0}")]
    ImageExists(String),

    #[error("store error: {0}")]
    Store(#[from] pokewiki_store::StoreError),
}

pub type PageResult<T> = Result<T, PageError>;
