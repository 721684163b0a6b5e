//! Password hashing.
//!
//! Argon2id with a fresh random salt per hash, stored as a PHC string.

use crate::types::{AppError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

const DUMMY_PASSWORD: &str = "novadom-dummy-password-0";

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Hashes and verifies passwords. Holds no state besides its cost
/// parameters and a dummy hash computed under those parameters.
#[derive(Debug)]
pub struct CredentialStore {
    params: Params,
    dummy_hash: String,
}

impl CredentialStore {
    /// Fails if the cost parameters are outside argon2's accepted range or
    /// the dummy hash cannot be computed.
    pub fn new(params: HashParams) -> Result<Self> {
        let params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Invalid argon2 parameters: {}", e)))?;

        let mut store = Self {
            params,
            dummy_hash: String::new(),
        };
        store.dummy_hash = store.hash(DUMMY_PASSWORD)?;

        Ok(store)
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes a password. Two calls with the same input give different output.
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.hasher()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// Verifies a password against a stored PHC hash.
    ///
    /// Cost parameters are read from the hash itself, so hashes created under
    /// older settings keep verifying. Malformed hashes return `false`.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(error = %e, "stored password hash is not a valid PHC string");
                return false;
            }
        };

        self.hasher()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Burns the same CPU as a real verification. Used when no account matches
    /// the email so the response time does not reveal whether it exists.
    pub fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.dummy_hash);
    }
}
