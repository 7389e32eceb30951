//! Cryptographic utilities shared across Habitek crates
//!
//! Provides password hashing with random salts, plain SHA-256 digests for
//! token storage, and constant-time comparison to prevent timing attacks.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Compute the hex-encoded SHA-256 digest of an input string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time equality over two byte slices.
///
/// Returns false on length mismatch without comparing contents;
/// otherwise every byte is examined regardless of where the first
/// difference occurs.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Hash a password with a fresh random salt.
///
/// The stored format is `hex(salt):hex(sha256(password || salt))`.
pub fn hash_password(password: &str) -> String {
    let salt: [u8; 32] = rand::thread_rng().gen();
    hash_with_salt(password, &salt)
}

fn hash_with_salt(secret: &str, salt: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(salt);
    let hash = hasher.finalize();
    format!("{}:{}", hex::encode(salt), hex::encode(hash))
}

/// Verify a password against a stored `salt:hash` value using
/// constant-time comparison.
pub fn verify_password(candidate: &str, stored_hash: &str) -> bool {
    let parts: Vec<&str> = stored_hash.split(':').collect();
    if parts.len() != 2 {
        return false;
    }

    let salt = match hex::decode(parts[0]) {
        Ok(salt) => salt,
        Err(_) => return false,
    };

    let hash = match hex::decode(parts[1]) {
        Ok(hash) => hash,
        Err(_) => return false,
    };

    let mut hasher = Sha256::new();
    hasher.update(candidate.as_bytes());
    hasher.update(&salt);
    let candidate_hash = hasher.finalize();

    constant_time_eq(&hash, &candidate_hash)
}
