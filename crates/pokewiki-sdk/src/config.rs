use std::path::Path;

use serde::{Deserialize, Serialize};

use pokewiki_auth::CredentialsConfig;
use pokewiki_game::GameConfig;
use pokewiki_pages::PagesConfig;
use pokewiki_types::{keys, DEFAULT_SEEN_LIMIT};

use crate::error::{SdkError, SdkResult};

/// Storage and hashing settings shared by every wiki service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    /// Bucket for pages, images, game records and the pokedex.
    pub content_bucket: String,
    /// Bucket for password digests.
    pub credentials_bucket: String,
    /// Application-wide secret mixed into every password digest. Changing it
    /// invalidates all stored passwords.
    pub secret_salt: String,
    /// Encoded size in bytes past which a player's seen set is reset.
    pub seen_limit: usize,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            content_bucket: keys::DEFAULT_CONTENT_BUCKET.into(),
            credentials_bucket: keys::DEFAULT_CREDENTIALS_BUCKET.into(),
            secret_salt: "pokewiki".into(),
            seen_limit: DEFAULT_SEEN_LIMIT,
        }
    }
}

impl WikiConfig {
    pub fn from_toml_str(text: &str) -> SdkResult<Self> {
        toml::from_str(text).map_err(|e| SdkError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn game(&self) -> GameConfig {
        GameConfig {
            bucket: self.content_bucket.clone(),
            seen_limit: self.seen_limit,
        }
    }

    pub fn pages(&self) -> PagesConfig {
        PagesConfig {
            bucket: self.content_bucket.clone(),
        }
    }

    pub fn credentials(&self) -> CredentialsConfig {
        CredentialsConfig {
            bucket: self.credentials_bucket.clone(),
        }
    }
}
