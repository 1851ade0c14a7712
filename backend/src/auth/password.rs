//! Password hashing using argon2 (bcrypt supported)
//!
//! Provides salted, deliberately slow password hashing and verification.
//!
//! # Performance Considerations
//!
//! Both algorithms are intentionally CPU-intensive. In async contexts use
//! `hash_async` / `verify_async`, which run on the blocking thread pool.

use crate::config::{PasswordAlgorithm, PasswordConfig};
use argon2::{
    password_hash::{
        self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

/// Errors raised by the password hasher
#[derive(Error, Debug)]
pub enum HashError {
    #[error("failed to hash password: {0}")]
    Hashing(String),

    /// The stored hash cannot be parsed by either supported algorithm
    #[error("stored password hash is malformed")]
    InvalidHash,

    #[error("invalid password hasher parameters: {0}")]
    InvalidParams(String),

    #[error("hashing task failed: {0}")]
    Task(String),
}

/// Password hashing service
///
/// New hashes use the configured algorithm. Verification detects the
/// algorithm from the stored hash, so accounts hashed with bcrypt keep
/// working after switching the default to Argon2id (and vice versa).
#[derive(Clone)]
pub struct PasswordService {
    algorithm: PasswordAlgorithm,
    argon2_params: Params,
    bcrypt_cost: u32,
}

impl PasswordService {
    /// Build a hasher from configuration, rejecting out-of-range cost factors
    pub fn new(config: &PasswordConfig) -> Result<Self, HashError> {
        let argon2_params = Params::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            1,
            None,
        )
        .map_err(|e| HashError::InvalidParams(e.to_string()))?;

        if !(4..=31).contains(&config.bcrypt_cost) {
            return Err(HashError::InvalidParams(format!(
                "bcrypt cost must be between 4 and 31, got {}",
                config.bcrypt_cost
            )));
        }

        Ok(Self {
            algorithm: config.algorithm,
            argon2_params,
            bcrypt_cost: config.bcrypt_cost,
        })
    }

    pub fn algorithm(&self) -> PasswordAlgorithm {
        self.algorithm
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.argon2_params.clone())
    }

    /// Hash a password (blocking operation)
    ///
    /// A fresh random salt is drawn on every call.
    pub fn hash(&self, password: &str) -> Result<String, HashError> {
        match self.algorithm {
            PasswordAlgorithm::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                let hash = self
                    .argon2()
                    .hash_password(password.as_bytes(), &salt)
                    .map_err(|e| HashError::Hashing(e.to_string()))?;
                Ok(hash.to_string())
            }
            PasswordAlgorithm::Bcrypt => bcrypt::hash(password, self.bcrypt_cost)
                .map_err(|e| HashError::Hashing(e.to_string())),
        }
    }

    /// Hash a password asynchronously (non-blocking)
    pub async fn hash_async(&self, password: String) -> Result<String, HashError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| HashError::Task(e.to_string()))?
    }

    /// Verify a password against a stored hash (blocking operation)
    ///
    /// Returns `Ok(false)` on mismatch. Errors only if `hash` is not a
    /// well-formed bcrypt or PHC string.
    pub fn verify(hash: &str, password: &str) -> Result<bool, HashError> {
        if is_bcrypt_hash(hash) {
            return bcrypt::verify(password, hash).map_err(|_| HashError::InvalidHash);
        }

        let parsed_hash = PasswordHash::new(hash).map_err(|_| HashError::InvalidHash)?;
        // The generic verifier reports a missing salt or output as a mismatch
        if parsed_hash.salt.is_none() || parsed_hash.hash.is_none() {
            return Err(HashError::InvalidHash);
        }

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(_) => Err(HashError::InvalidHash),
        }
    }

    /// Verify a password asynchronously (non-blocking)
    pub async fn verify_async(hash: String, password: String) -> Result<bool, HashError> {
        tokio::task::spawn_blocking(move || Self::verify(&hash, &password))
            .await
            .map_err(|e| HashError::Task(e.to_string()))?
    }
}

fn is_bcrypt_hash(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2x$", "$2y$"]
        .iter()
        .any(|prefix| hash.starts_with(prefix))
}
