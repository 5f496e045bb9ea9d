//! Argon2 credential hashing

use std::fmt::Debug;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::Argon2;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// One-way hashing of plaintext credentials
#[cfg_attr(test, automock)]
pub trait PasswordHasher: Send + Sync + Debug {
    /// PHC-encoded digest of `plaintext` under a fresh random salt
    fn hash(&self, plaintext: &str) -> Result<String, DomainError>;

    /// Whether `plaintext` matches `encoded`; malformed digests never match
    fn verify(&self, plaintext: &str, encoded: &str) -> bool;
}

/// Argon2id with the `argon2` crate's default cost parameters
#[derive(Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Debug for Argon2Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Hasher").finish_non_exhaustive()
    }
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        let digest = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| DomainError::hashing(format!("Failed to hash password: {}", e)))?;

        Ok(digest.to_string())
    }

    fn verify(&self, plaintext: &str, encoded: &str) -> bool {
        PasswordHash::new(encoded)
            .and_then(|parsed| self.argon2.verify_password(plaintext.as_bytes(), &parsed))
            .is_ok()
    }
}
