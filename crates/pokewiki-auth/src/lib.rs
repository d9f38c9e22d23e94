//! Credential storage for Pokewiki.
//!
//! One blob per username in the credentials bucket holds the hex digest of
//! the user's salted password. Registration also provisions the user's game
//! record and seen set.

pub mod credentials;
pub mod error;

pub use credentials::{Account, CredentialStore, CredentialsConfig};
pub use error::{AuthError, AuthResult};
