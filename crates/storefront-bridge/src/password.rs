//! Argon2id password hashing.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use storefront_core::error::DomainError;
use storefront_enduser::domain::adapters::PasswordHasher;

/// Hashes passwords with Argon2id (default parameters) and a random salt,
/// producing PHC strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    /// Creates a hasher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::Infrastructure(format!("password hashing failed: {e}")))
    }

    fn verify(&self, password: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            tracing::warn!("stored password digest is not a valid PHC string");
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verifies_original_password_only() {
        // Arrange
        let hasher = Argon2PasswordHasher::new();

        // Act
        let digest = hasher.hash("abcd1234!").unwrap();

        // Assert
        assert!(digest.starts_with("$argon2id$"));
        assert!(hasher.verify("abcd1234!", &digest));
        assert!(!hasher.verify("abcd1234?", &digest));
    }

    #[test]
    fn test_hash_salts_each_digest() {
        let hasher = Argon2PasswordHasher::new();

        let first = hasher.hash("abcd1234!").unwrap();
        let second = hasher.hash("abcd1234!").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_rejects_malformed_digest() {
        let hasher = Argon2PasswordHasher::new();

        assert!(!hasher.verify("abcd1234!", "plain:abcd1234!"));
    }
}
