//! Argon2id password hashing.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::Argon2;
use linkboard_core::providers::PasswordHasher;
use linkboard_core::{ContentError, Result};

/// Argon2id with the crate's default parameters. Hashes are PHC strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    /// Hasher with default parameters.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ContentError::Hashing(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| ContentError::Hashing(e.to_string()))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(ContentError::Hashing(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("correct horse").expect("hash");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &hash).expect("verify"));
        assert!(!hasher.verify("wrong horse", &hash).expect("verify"));
    }

    #[test]
    fn test_salts_differ() {
        let hasher = Argon2Hasher::new();
        let a = hasher.hash("same").expect("hash");
        let b = hasher.hash("same").expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        let result = Argon2Hasher::new().verify("pw", "not-a-phc-string");
        assert!(matches!(result, Err(ContentError::Hashing(_))));
    }
}
