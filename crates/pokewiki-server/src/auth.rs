use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::{HeaderMap, AUTHORIZATION};
use axum::http::request::Parts;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use pokewiki_crypto::SessionToken;

use crate::error::{ServerError, ServerResult};
use crate::router::AppState;

/// Sessions never outlive this, whatever the configuration says.
const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
}

impl Identity {
    pub fn user(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Clone, Debug)]
pub enum Credentials {
    Bearer(String),
    Anonymous,
}

impl Credentials {
    /// Read an `Authorization: Bearer <token>` header. The scheme is
    /// case-insensitive.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .and_then(|value| {
                let (scheme, token) = value.split_once(' ')?;
                scheme.eq_ignore_ascii_case("bearer").then(|| token.trim().to_string())
            });
        match token {
            Some(token) if !token.is_empty() => Self::Bearer(token),
            _ => Self::Anonymous,
        }
    }
}

/// Resolves request credentials to a signed-in user.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// `Ok(None)` for anonymous requests; `Err(Unauthorized)` for a token
    /// that is unknown or expired.
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Option<Identity>>;
}

/// A session handed out at sign-in.
#[derive(Clone, Debug, Serialize)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

struct SessionEntry {
    username: String,
    expires_at: DateTime<Utc>,
}

/// In-process bearer-token sessions with a fixed lifetime.
///
/// Sessions are lost on restart.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionToken, SessionEntry>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        let secs = ttl_secs.min(MAX_SESSION_TTL_SECS) as i64;
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::seconds(secs),
        }
    }

    pub fn create(&self, username: &str) -> ServerResult<Session> {
        self.create_at(username, Utc::now())
    }

    fn create_at(&self, username: &str, now: DateTime<Utc>) -> ServerResult<Session> {
        let token = SessionToken::generate();
        let expires_at = now + self.ttl;
        let mut sessions = self.write()?;
        sessions.retain(|_, entry| entry.expires_at > now);
        sessions.insert(
            token,
            SessionEntry {
                username: username.to_string(),
                expires_at,
            },
        );
        debug!(username, active = sessions.len(), "session created");
        Ok(Session {
            token: token.to_hex(),
            username: username.to_string(),
            expires_at,
        })
    }

    /// The username behind a live token.
    pub fn resolve(&self, token: &str) -> ServerResult<Option<String>> {
        self.resolve_at(token, Utc::now())
    }

    fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> ServerResult<Option<String>> {
        let Some(token) = SessionToken::from_hex(token) else {
            return Ok(None);
        };
        let sessions = self
            .sessions
            .read()
            .map_err(|_| ServerError::Internal("session table poisoned".into()))?;
        Ok(sessions
            .get(&token)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.username.clone()))
    }

    /// Forget a token. Returns whether it was known.
    pub fn revoke(&self, token: &str) -> ServerResult<bool> {
        let Some(token) = SessionToken::from_hex(token) else {
            return Ok(false);
        };
        Ok(self.write()?.remove(&token).is_some())
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(&self) -> ServerResult<std::sync::RwLockWriteGuard<'_, HashMap<SessionToken, SessionEntry>>> {
        self.sessions
            .write()
            .map_err(|_| ServerError::Internal("session table poisoned".into()))
    }
}

#[async_trait]
impl AuthProvider for SessionStore {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Option<Identity>> {
        match credentials {
            Credentials::Anonymous => Ok(None),
            Credentials::Bearer(token) => self
                .resolve(token)?
                .map(Identity::user)
                .map(Some)
                .ok_or(ServerError::Unauthorized),
        }
    }
}

/// Extractor for routes that require a signed-in user.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub identity: Identity,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let credentials = Credentials::from_headers(&parts.headers);
        let identity = state
            .sessions
            .authenticate(&credentials)
            .await?
            .ok_or(ServerError::Unauthorized)?;
        let Credentials::Bearer(token) = credentials else {
            return Err(ServerError::Unauthorized);
        };
        Ok(Self { identity, token })
    }
}

/// Extractor for routes that behave differently when signed in. A bad token
/// is still rejected.
#[derive(Clone, Debug)]
pub struct MaybeUser(pub Option<Identity>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let credentials = Credentials::from_headers(&parts.headers);
        Ok(Self(state.sessions.authenticate(&credentials).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_header_parsing() {
        assert!(matches!(
            Credentials::from_headers(&headers("Bearer abc")),
            Credentials::Bearer(t) if t == "abc"
        ));
        assert!(matches!(
            Credentials::from_headers(&headers("bearer   abc ")),
            Credentials::Bearer(t) if t == "abc"
        ));
        assert!(matches!(Credentials::from_headers(&headers("Basic abc")), Credentials::Anonymous));
        assert!(matches!(Credentials::from_headers(&headers("Bearer ")), Credentials::Anonymous));
        assert!(matches!(Credentials::from_headers(&HeaderMap::new()), Credentials::Anonymous));
    }

    #[test]
    fn sessions_resolve_until_revoked() {
        let sessions = SessionStore::new(60);
        let session = sessions.create("ash").unwrap();
        assert_eq!(session.token.len(), 64);
        assert_eq!(sessions.resolve(&session.token).unwrap().as_deref(), Some("ash"));

        assert!(sessions.revoke(&session.token).unwrap());
        assert!(!sessions.revoke(&session.token).unwrap());
        assert!(sessions.resolve(&session.token).unwrap().is_none());
    }

    #[test]
    fn sessions_expire() {
        let sessions = SessionStore::new(60);
        let start = Utc::now();
        let session = sessions.create_at("ash", start).unwrap();
        assert!(sessions.resolve_at(&session.token, start + Duration::seconds(59)).unwrap().is_some());
        assert!(sessions.resolve_at(&session.token, start + Duration::seconds(60)).unwrap().is_none());

        // Expired entries are swept on the next sign-in.
        sessions.create_at("misty", start + Duration::seconds(120)).unwrap();
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn garbage_tokens_resolve_to_nobody() {
        let sessions = SessionStore::new(60);
        assert!(sessions.resolve("not-hex").unwrap().is_none());
        assert!(sessions.resolve(&"0".repeat(64)).unwrap().is_none());
    }

    #[tokio::test]
    async fn provider_distinguishes_anonymous_from_bad_token() {
        let sessions = SessionStore::new(60);
        let session = sessions.create("brock").unwrap();

        assert_eq!(sessions.authenticate(&Credentials::Anonymous).await.unwrap(), None);
        assert_eq!(
            sessions.authenticate(&Credentials::Bearer(session.token)).await.unwrap(),
            Some(Identity::user("brock"))
        );
        assert!(matches!(
            sessions.authenticate(&Credentials::Bearer("bogus".into())).await,
            Err(ServerError::Unauthorized)
        ));
    }
}
