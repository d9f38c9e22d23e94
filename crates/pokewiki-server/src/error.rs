use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use pokewiki_auth::AuthError;
use pokewiki_game::GameError;
use pokewiki_pages::PageError;
use pokewiki_sdk::SdkError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("sign-in required")]
    Unauthorized,

    #[error("wrong username or password")]
    InvalidCredentials,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Pages(#[from] PageError),

    #[error(transparent)]
    Sdk(#[from] SdkError),

    #[error("store error: {0}")]
    Store(#[from] pokewiki_store::StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Auth(AuthError::InvalidUsername(_)) => StatusCode::BAD_REQUEST,
            Self::Game(GameError::UnknownPlayer(_) | GameError::UnknownPokemon(_)) => {
                StatusCode::NOT_FOUND
            }
            Self::Game(GameError::NotServed(_)) => StatusCode::CONFLICT,
            Self::Pages(PageError::InvalidPageName(_) | PageError::InvalidImageName(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Pages(PageError::ImageExists(_)) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
