//! Cryptographic logics.

use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Argon2, Params, Version};
use rand::rngs::OsRng;

use crate::config::Argon2 as ArgonConfig;

type Result<T> = std::result::Result<T, CryptoError>;

#[derive(thiserror::Error, Debug)]
pub enum CryptoError {
    #[error("argon2 error: {0}")]
    Argon2(String),
}

/// Password manager that uses Argon2id and PHC string format for hashing and
/// verification.
///
/// Hashing is intentionally slow; callers on the request path must run it
/// through `spawn_blocking`.
pub struct PasswordManager {
    params: Params,
}

impl PasswordManager {
    /// Create a new [`PasswordManager`].
    pub fn new(config: Option<ArgonConfig>) -> Result<Self> {
        let config = config.unwrap_or_default();

        let params = Params::new(
            config.memory_cost,
            config.iterations,
            config.parallelism,
            Some(config.hash_length),
        )
        .map_err(|err| CryptoError::Argon2(err.to_string()))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2 {
        Argon2::new(
            argon2::Algorithm::Argon2id,
            Version::V0x13,
            self.params.clone(),
        )
    }

    /// Hash password using Argon2id with a random salt.
    pub fn hash_password(&self, password: impl AsRef<[u8]>) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_ref(), &salt)
            .map_err(|e| CryptoError::Argon2(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Verify password against a PHC string.
    ///
    /// Returns `Ok(false)` on mismatch; `Err` only when the stored hash
    /// cannot be parsed.
    pub fn verify_password(
        &self,
        password: impl AsRef<[u8]>,
        phc_hash: &str,
    ) -> Result<bool> {
        let parsed = PasswordHash::new(phc_hash)
            .map_err(|e| CryptoError::Argon2(e.to_string()))?;

        Ok(self
            .argon2()
            .verify_password(password.as_ref(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weak_manager() -> PasswordManager {
        // Cheap parameters, tests only.
        PasswordManager::new(Some(ArgonConfig {
            memory_cost: 4096,
            iterations: 1,
            parallelism: 1,
            hash_length: 32,
        }))
        .unwrap()
    }

    #[test]
    fn test_hash_never_contains_plaintext() {
        let pwd = weak_manager();
        let hash = pwd.hash_password("my_plain_password").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("my_plain_password"));
    }

    #[test]
    fn test_verify_roundtrip() {
        let pwd = weak_manager();
        let hash = pwd.hash_password("correct horse").unwrap();

        assert!(pwd.verify_password("correct horse", &hash).unwrap());
        assert!(!pwd.verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        let pwd = weak_manager();
        assert!(pwd.verify_password("anything", "not-a-phc-string").is_err());
    }
}
