//! Password hashing (Argon2id, PHC string format).

use argon2::Argon2;
use argon2::password_hash::{
    self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// One-way password hashing with verification.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, PasswordError>;

    /// `Ok(false)` on mismatch; `Err` only when the stored hash cannot be parsed.
    fn verify(&self, plain: &str, hash: &str) -> Result<bool, PasswordError>;
}

/// Argon2id with the crate's default parameters and a random salt per hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    fn verify(&self, plain: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;
        match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::MalformedHash(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash("secret1").unwrap();

        assert_ne!(hash, "secret1");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("secret1", &hash).unwrap());
        assert!(!hasher.verify("secret2", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let hasher = Argon2PasswordHasher::new();
        assert_ne!(hasher.hash("secret1").unwrap(), hasher.hash("secret1").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let err = Argon2PasswordHasher::new().verify("x", "plaintext").unwrap_err();
        assert!(matches!(err, PasswordError::MalformedHash(_)));
    }
}
