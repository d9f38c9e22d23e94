/// Computes and checks password digests.
///
/// Credential storage only ever sees the hex digest produced here, never the
/// password. Implementations must be deterministic: the same
/// `(username, password)` pair always yields the same digest.
pub trait CredentialHasher: Send + Sync {
    /// Digest of `password` salted with `username` and an application secret.
    fn digest(&self, username: &str, password: &str) -> String;

    /// Check a password against a previously stored digest.
    fn verify(&self, username: &str, password: &str, stored: &str) -> bool {
        self.digest(username, password) == stored
    }
}

/// Salted BLAKE3 password hasher.
///
/// The digest covers a domain tag, the username, an application-wide secret
/// and the password, each length-prefixed so that shifting bytes between the
/// username and password cannot produce the same input.
#[derive(Clone)]
pub struct SaltedBlake3Hasher {
    secret: String,
}

impl SaltedBlake3Hasher {
    /// Domain tag for password digests.
    pub const DOMAIN: &'static str = "pokewiki-credential-v1";

    pub fn new(secret: impl Into<String>) -> Result<Self, HasherError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(HasherError::EmptySecret);
        }
        Ok(Self { secret })
    }

    fn hash(&self, username: &str, password: &str) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(Self::DOMAIN.as_bytes());
        hasher.update(b":");
        for part in [username, self.secret.as_str(), password] {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        hasher.finalize()
    }
}

impl CredentialHasher for SaltedBlake3Hasher {
    fn digest(&self, username: &str, password: &str) -> String {
        self.hash(username, password).to_hex().to_string()
    }

    fn verify(&self, username: &str, password: &str, stored: &str) -> bool {
        // blake3::Hash equality is constant-time.
        match blake3::Hash::from_hex(stored.trim()) {
            Ok(expected) => self.hash(username, password) == expected,
            Err(_) => false,
        }
    }
}

impl std::fmt::Debug for SaltedBlake3Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaltedBlake3Hasher")
            .field("domain", &Self::DOMAIN)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Errors from hasher construction.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("password secret must not be empty")]
    EmptySecret,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> SaltedBlake3Hasher {
        SaltedBlake3Hasher::new("pokewiki").unwrap()
    }

    #[test]
    fn digest_is_deterministic() {
        let h = hasher();
        assert_eq!(h.digest("ash", "pikachu"), h.digest("ash", "pikachu"));
    }

    #[test]
    fn digest_is_hex() {
        let digest = hasher().digest("ash", "pikachu");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn username_salts_the_digest() {
        let h = hasher();
        assert_ne!(h.digest("ash", "same"), h.digest("misty", "same"));
    }

    #[test]
    fn secret_salts_the_digest() {
        let other = SaltedBlake3Hasher::new("another-secret").unwrap();
        assert_ne!(hasher().digest("ash", "pikachu"), other.digest("ash", "pikachu"));
    }

    #[test]
    fn boundary_shift_changes_digest() {
        let h = hasher();
        assert_ne!(h.digest("ab", "c"), h.digest("a", "bc"));
    }

    #[test]
    fn verify_round_trip() {
        let h = hasher();
        let stored = h.digest("ash", "pikachu");
        assert!(h.verify("ash", "pikachu", &stored));
        assert!(!h.verify("ash", "raichu", &stored));
        assert!(!h.verify("gary", "pikachu", &stored));
    }

    #[test]
    fn verify_rejects_garbage() {
        assert!(!hasher().verify("ash", "pikachu", "not-a-digest"));
    }

    #[test]
    fn empty_secret_rejected() {
        assert_eq!(SaltedBlake3Hasher::new("").unwrap_err(), HasherError::EmptySecret);
    }

    #[test]
    fn debug_hides_secret() {
        let debug = format!("{:?}", hasher());
        assert!(debug.contains("redacted"));
        assert!(!debug.contains("pokewiki\""));
    }
}
