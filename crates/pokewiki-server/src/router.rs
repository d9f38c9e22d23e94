use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use pokewiki_sdk::Wiki;

use crate::auth::SessionStore;
use crate::handler;

/// Shared by every handler; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub wiki: Arc<Wiki>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(wiki: Wiki, sessions: SessionStore) -> Self {
        Self {
            wiki: Arc::new(wiki),
            sessions: Arc::new(sessions),
        }
    }
}

/// Build the axum router with all Pokewiki endpoints.
pub fn build_router(state: AppState, max_upload_size: usize) -> Router {
    Router::new()
        .route("/", get(handler::index))
        .route("/about", get(handler::about))
        .route("/health", get(handler::health))
        .route("/pages", get(handler::list_pages).post(handler::query_pages))
        .route("/pages/:name", get(handler::show_page))
        .route("/login", get(handler::login_form).post(handler::login))
        .route("/signup", get(handler::signup_form).post(handler::signup))
        .route("/logout", post(handler::logout))
        .route("/upload", get(handler::upload_form).post(handler::upload))
        .route("/game", get(handler::game))
        .route("/game/guess", post(handler::guess))
        .route("/leaderboard", get(handler::leaderboard))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(TraceLayer::new_for_http())
}
