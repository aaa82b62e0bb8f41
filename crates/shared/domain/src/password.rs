//! Password encoding - one-way hashing and verification.
//!
//! The service layer only sees the `PasswordEncoder` capability; the
//! Argon2 configuration lives here in one place.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{DomainError, DomainResult};

/// One-way password encoder.
pub trait PasswordEncoder: Send + Sync {
    /// Hash a plaintext password. Every call uses a fresh salt.
    fn encode(&self, raw: &str) -> DomainResult<String>;

    /// Check a plaintext password against a stored hash.
    /// Malformed hashes never match.
    fn matches(&self, raw: &str, encoded: &str) -> bool;
}

/// Argon2id encoder with the crate's default parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordEncoder;

impl Argon2PasswordEncoder {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}

impl PasswordEncoder for Argon2PasswordEncoder {
    fn encode(&self, raw: &str) -> DomainResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|e| DomainError::internal(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    fn matches(&self, raw: &str, encoded: &str) -> bool {
        let parsed = match PasswordHash::new(encoded) {
            Ok(parsed) => parsed,
            Err(_) => return false,
        };

        Self::argon2()
            .verify_password(raw.as_bytes(), &parsed)
            .is_ok()
    }
}
