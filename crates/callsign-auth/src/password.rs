//! Credential hashing with Argon2id.
//!
//! Parameters follow the OWASP recommendation (memory: 19 MiB,
//! iterations: 2, parallelism: 1). Salt is randomly generated per
//! hash. An optional pepper (server-side secret) is prepended to the
//! password before hashing and verification.

use std::borrow::Cow;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::error::AuthError;

#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    pepper: Option<String>,
}

impl CredentialHasher {
    pub fn new(pepper: Option<String>) -> Result<Self, AuthError> {
        let params = argon2::Params::new(19456, 2, 1, None)
            .map_err(|e| AuthError::Hashing(format!("argon2 params error: {e}")))?;
        Ok(Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
            pepper,
        })
    }

    fn peppered<'a>(&self, password: &'a str) -> Cow<'a, str> {
        match &self.pepper {
            Some(p) => Cow::Owned(format!("{p}{password}")),
            None => Cow::Borrowed(password),
        }
    }

    /// Hash a password into an Argon2id PHC string.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(self.peppered(password).as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hashing(format!("password hash error: {e}")))
    }

    /// Verify a password against a PHC string.
    ///
    /// Returns `Ok(false)` on mismatch and `Err(AuthError::Hashing)`
    /// only when the stored hash is malformed.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AuthError::Hashing(format!("invalid hash format: {e}")))?;

        match self
            .argon2
            .verify_password(self.peppered(password).as_bytes(), &parsed)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Hashing(format!("verify error: {e}"))),
        }
    }

    /// [`hash`](Self::hash) on the blocking thread pool.
    pub async fn hash_blocking(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Hashing(format!("hashing task failed: {e}")))?
    }

    /// [`verify`](Self::verify) on the blocking thread pool.
    pub async fn verify_blocking(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Hashing(format!("verification task failed: {e}")))?
    }
}
