//! Cryptographic primitives for Pokewiki.
//!
//! Provides salted BLAKE3 password digests behind the [`CredentialHasher`]
//! seam and random session tokens.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod hasher;
pub mod token;

pub use hasher::{CredentialHasher, HasherError, SaltedBlake3Hasher};
pub use token::SessionToken;
