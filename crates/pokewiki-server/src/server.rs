use tokio::net::TcpListener;

use pokewiki_sdk::Wiki;

use crate::auth::SessionStore;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::{build_router, AppState};

/// Pokewiki HTTP server.
pub struct PokewikiServer {
    config: ServerConfig,
    state: AppState,
}

impl PokewikiServer {
    /// Open the store named by the config (in memory when `data_root` is
    /// unset) and prepare a fresh session table.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let wiki = match &config.data_root {
            Some(root) => Wiki::open(root, config.wiki.clone())?,
            None => {
                tracing::warn!("no data_root configured, wiki contents will not persist");
                Wiki::new(
                    std::sync::Arc::new(pokewiki_sdk::InMemoryObjectStore::new()),
                    config.wiki.clone(),
                )?
            }
        };
        Ok(Self::with_wiki(config, wiki))
    }

    /// Serve an already-built wiki.
    pub fn with_wiki(config: ServerConfig, wiki: Wiki) -> Self {
        let sessions = SessionStore::new(config.session_ttl_secs);
        Self {
            state: AppState::new(wiki, sessions),
            config,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone(), self.config.max_upload_size)
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("pokewiki server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_by_default() {
        let server = PokewikiServer::new(ServerConfig::default()).unwrap();
        assert_eq!(server.config().bind_addr.port(), 8080);
        assert!(server.state().sessions.is_empty());
        let _router = server.router();
    }

    #[test]
    fn opens_data_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            data_root: Some(dir.path().to_path_buf()),
            ..ServerConfig::default()
        };
        let server = PokewikiServer::new(config).unwrap();
        server.state().wiki.credentials().register("ash", "pikachu").unwrap();
        assert!(dir.path().join("users-passwords/ash").is_file());
    }

    #[test]
    fn empty_secret_fails_to_start() {
        let mut config = ServerConfig::default();
        config.wiki.secret_salt.clear();
        assert!(matches!(PokewikiServer::new(config), Err(ServerError::Sdk(_))));
    }
}
