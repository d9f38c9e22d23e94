use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pokewiki_crypto::CredentialHasher;
use pokewiki_game::GameService;
use pokewiki_store::{ObjectStore, ObjectStoreExt};
use pokewiki_types::{keys, validate_username};

use crate::error::AuthResult;

/// Where digests are stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub bucket: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            bucket: keys::DEFAULT_CREDENTIALS_BUCKET.into(),
        }
    }
}

/// A stored account as seen by session layers.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub digest: String,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Username → password digest store.
///
/// Creation is check-then-write: two concurrent sign-ups for the same name
/// can both pass the existence check, and the later write wins.
pub struct CredentialStore {
    store: Arc<dyn ObjectStore>,
    hasher: Arc<dyn CredentialHasher>,
    game: Arc<GameService>,
    config: CredentialsConfig,
}

impl CredentialStore {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        hasher: Arc<dyn CredentialHasher>,
        game: Arc<GameService>,
        config: CredentialsConfig,
    ) -> Self {
        Self {
            store,
            hasher,
            game,
            config,
        }
    }

    /// Create an account.
    ///
    /// Returns `Ok(false)` without writing anything if the username is taken.
    /// On success the user also gets an unranked game record and an empty
    /// seen set.
    pub fn register(&self, username: &str, password: &str) -> AuthResult<bool> {
        validate_username(username)?;
        let key = keys::credential_key(username);
        if self.store.exists(&self.config.bucket, &key)? {
            debug!(username, "sign-up rejected, username taken");
            return Ok(false);
        }

        let digest = self.hasher.digest(username, password);
        self.store.put_text(&self.config.bucket, &key, &digest)?;
        self.game.provision_player(username)?;

        info!(username, "account created");
        Ok(true)
    }

    /// Check a username/password pair.
    ///
    /// Unknown users, malformed usernames and wrong passwords all yield
    /// `Ok(false)` so callers cannot tell them apart.
    pub fn authenticate(&self, username: &str, password: &str) -> AuthResult<bool> {
        let Some(account) = self.lookup(username)? else {
            debug!("sign-in failed");
            return Ok(false);
        };
        let ok = self.hasher.verify(username, password, &account.digest);
        if ok {
            info!(username, "signed in");
        } else {
            debug!("sign-in failed");
        }
        Ok(ok)
    }

    /// The stored account for `username`, if any.
    pub fn account(&self, username: &str) -> AuthResult<Option<Account>> {
        validate_username(username)?;
        self.lookup(username)
    }

    pub fn exists(&self, username: &str) -> AuthResult<bool> {
        if validate_username(username).is_err() {
            return Ok(false);
        }
        Ok(self
            .store
            .exists(&self.config.bucket, &keys::credential_key(username))?)
    }

    fn lookup(&self, username: &str) -> AuthResult<Option<Account>> {
        if validate_username(username).is_err() {
            return Ok(None);
        }
        let digest = self
            .store
            .get_text(&self.config.bucket, &keys::credential_key(username))?;
        Ok(digest.map(|digest| Account {
            username: username.to_string(),
            digest: digest.trim().to_string(),
        }))
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
