//! HTTP server for Pokewiki.
//!
//! Serves the wiki's pages, accounts and guessing game as JSON over axum.
//! Sign-in hands out bearer tokens; routes that change state on behalf of a
//! user require one.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use auth::{AuthProvider, Credentials, CurrentUser, Identity, MaybeUser, Session, SessionStore};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use router::{build_router, AppState};
pub use server::PokewikiServer;
