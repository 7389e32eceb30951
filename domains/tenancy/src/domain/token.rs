//! Invitation token issuing and verification
//!
//! Tokens are 32 random bytes, URL-safe base64 without padding (43 chars).
//! Storage keys on the hex SHA-256 of the token, so a database read never
//! exposes a usable credential; presented tokens are re-hashed and compared
//! constant-time. Unsubscribe tokens live in a separate hash namespace so
//! one can never stand in for the other.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use habitek_common::{constant_time_eq, sha256_hex, Error, Result};

/// A freshly issued token with its storage hash. The raw token leaves the
/// system exactly once, inside the invitation email.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub hash: String,
}

pub struct TokenIssuer;

impl TokenIssuer {
    /// Generate a new invitation token and its lookup hash.
    pub fn issue() -> Result<IssuedToken> {
        let mut bytes = [0u8; 32];
        getrandom::getrandom(&mut bytes)
            .map_err(|e| Error::Internal(format!("Failed to generate random bytes: {}", e)))?;
        let token = URL_SAFE_NO_PAD.encode(bytes);
        let hash = sha256_hex(&token);
        Ok(IssuedToken { token, hash })
    }

    /// Hash a presented token for hash-keyed lookup.
    pub fn lookup_hash(token: &str) -> String {
        sha256_hex(token)
    }

    /// Constant-time check of a presented token against a stored hash.
    pub fn verify(presented: &str, stored_hash: &str) -> bool {
        let digest = sha256_hex(presented);
        constant_time_eq(digest.as_bytes(), stored_hash.as_bytes())
    }

    /// Deterministic unsubscribe token for reminder emails. The domain
    /// separator keeps it distinct from invitation token hashes.
    pub fn unsubscribe_token(email: &str, secret: &str) -> String {
        let material = format!("unsubscribe:{}:{}", email.to_lowercase(), secret);
        sha256_hex(&material)
    }

    pub fn verify_unsubscribe_token(presented: &str, email: &str, secret: &str) -> bool {
        let expected = Self::unsubscribe_token(email, secret);
        constant_time_eq(presented.as_bytes(), expected.as_bytes())
    }
}
