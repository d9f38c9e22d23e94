use std::path::Path;
use std::sync::Arc;

use tracing::info;

use pokewiki_auth::CredentialStore;
use pokewiki_crypto::{CredentialHasher, SaltedBlake3Hasher};
use pokewiki_game::GameService;
use pokewiki_pages::PageStore;
use pokewiki_store::{FsObjectStore, InMemoryObjectStore, ObjectStore};

use crate::config::WikiConfig;
use crate::error::SdkResult;

/// High-level Pokewiki API.
///
/// Constructed once per process and shared by reference; it holds no state
/// beyond its collaborators, so every call reads through to the store.
pub struct Wiki {
    store: Arc<dyn ObjectStore>,
    config: WikiConfig,
    game: Arc<GameService>,
    credentials: CredentialStore,
    pages: PageStore,
}

impl Wiki {
    /// Build a wiki over `store`, hashing passwords with salted BLAKE3.
    pub fn new(store: Arc<dyn ObjectStore>, config: WikiConfig) -> SdkResult<Self> {
        let hasher = Arc::new(SaltedBlake3Hasher::new(config.secret_salt.clone())?);
        Ok(Self::with_hasher(store, hasher, config))
    }

    /// Build a wiki with a caller-supplied password hasher.
    pub fn with_hasher(
        store: Arc<dyn ObjectStore>,
        hasher: Arc<dyn CredentialHasher>,
        config: WikiConfig,
    ) -> Self {
        let game = Arc::new(GameService::new(store.clone(), config.game()));
        let credentials =
            CredentialStore::new(store.clone(), hasher, game.clone(), config.credentials());
        let pages = PageStore::new(store.clone(), config.pages());
        Self {
            store,
            config,
            game,
            credentials,
            pages,
        }
    }

    /// A wiki backed by a fresh in-memory store with default settings.
    pub fn in_memory() -> SdkResult<Self> {
        Self::new(Arc::new(InMemoryObjectStore::new()), WikiConfig::default())
    }

    /// A wiki persisted under `root` on the local filesystem.
    pub fn open(root: impl AsRef<Path>, config: WikiConfig) -> SdkResult<Self> {
        let store = FsObjectStore::open(root.as_ref())?;
        info!(root = %root.as_ref().display(), "opened filesystem store");
        Self::new(Arc::new(store), config)
    }

    pub fn config(&self) -> &WikiConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub fn game(&self) -> &GameService {
        &self.game
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn pages(&self) -> &PageStore {
        &self.pages
    }
}

impl std::fmt::Debug for Wiki {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wiki")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
