//! Password hashing built around Argon2id
//!
//! Produces and verifies PHC-format records
//! (`$argon2id$v=19$m=...,t=...,p=...$<salt>$<hash>`). The salt and cost
//! parameters travel inside the record, so verification never needs them
//! supplied separately and records remain verifiable across instances
//! configured with different costs.

use argon2::password_hash::{Error as PhcError, PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier as _, Version};
use rand::rngs::OsRng;

use crate::error::{ErrorCategory, ErrorKind, Result, SecretError};

/// Default Argon2id cost parameters.
/// - memory_cost: 64 MiB keeps GPU cracking expensive
/// - time_cost: 3 iterations for interactive latency without sacrificing safety
/// - parallelism: 4 lanes
const MEMORY_COST_KIB: u32 = 64 * 1024;
const TIME_COST: u32 = 3;
const PARALLELISM: u32 = 4;

/// Stateless Argon2id password hashing with configurable costs.
pub struct PasswordHasher {
    memory_cost_kib: u32,
    time_cost: u32,
    parallelism: u32,
}

impl PasswordHasher {
    /// A hasher with the default cost parameters.
    pub fn new() -> PasswordHasher {
        Self::with_params(MEMORY_COST_KIB, TIME_COST, PARALLELISM)
    }

    /// A hasher with explicit memory (KiB), time, and parallelism costs.
    ///
    /// The costs are validated when a password is hashed; verification
    /// always honors the parameters embedded in the record instead.
    pub fn with_params(memory_cost_kib: u32, time_cost: u32, parallelism: u32) -> PasswordHasher {
        PasswordHasher {
            memory_cost_kib,
            time_cost,
            parallelism,
        }
    }

    fn argon2(&self) -> Result<Argon2<'static>> {
        let params = Params::new(self.memory_cost_kib, self.time_cost, self.parallelism, None)
            .map_err(|e| {
                SecretError::with_source(
                    ErrorCategory::Internal,
                    ErrorKind::HashingFailed,
                    format!("invalid Argon2 parameters: {}", e),
                    e,
                )
            })?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash a password with a fresh random salt, returning the PHC record.
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let record = self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                SecretError::with_source(
                    ErrorCategory::Internal,
                    ErrorKind::HashingFailed,
                    format!("password hashing failed: {}", e),
                    e,
                )
            })?;
        Ok(record.to_string())
    }

    /// Verify a password against a PHC record.
    ///
    /// Fails with `InvalidRecord` when the record is malformed or uses an
    /// unsupported algorithm, and with `VerifyMismatch` when the password
    /// does not match. The hash comparison itself is constant-time inside
    /// the argon2 crate.
    pub fn verify(&self, record: &str, password: &str) -> Result<()> {
        let parsed = PasswordHash::new(record).map_err(|e| {
            SecretError::with_source(
                ErrorCategory::User,
                ErrorKind::InvalidRecord,
                format!("hash record is malformed: {}", e),
                e,
            )
        })?;

        self.argon2()?
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|e| match e {
                PhcError::Password => SecretError::new(
                    ErrorCategory::User,
                    ErrorKind::VerifyMismatch,
                    "password does not match the hash record",
                ),
                other => SecretError::with_source(
                    ErrorCategory::User,
                    ErrorKind::InvalidRecord,
                    format!("hash record cannot be verified: {}", other),
                    other,
                ),
            })
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
