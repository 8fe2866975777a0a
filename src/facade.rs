//! The secret-management facade
//!
//! Composes one [`AeadCipher`] and one [`PasswordHasher`]. The two share
//! no logic; the facade exists so callers hold a single handle for both
//! concerns. Every operation is a pure function of its inputs and the
//! immutable bound key/configuration, so instances may be shared freely
//! across threads.

use crate::cipher::AeadCipher;
use crate::error::{ErrorCategory, ErrorKind, Result, SecretError};
use crate::key::Key;
use crate::password::PasswordHasher;

pub struct SecretFacade {
    cipher: AeadCipher,
    hasher: PasswordHasher,
}

impl SecretFacade {
    /// Bind a facade to an existing key, using the default hashing costs.
    ///
    /// Key validation happens when the key text is parsed into [`Key`];
    /// a facade can therefore never exist without usable key material.
    pub fn new(key: Key) -> SecretFacade {
        Self::with_hasher(key, PasswordHasher::new())
    }

    /// Bind a facade to an existing key with an explicit hasher
    /// configuration.
    pub fn with_hasher(key: Key, hasher: PasswordHasher) -> SecretFacade {
        SecretFacade {
            cipher: AeadCipher::new(&key),
            hasher,
        }
    }

    /// Generate a fresh random key. Stateless; callable without an
    /// instance.
    pub fn generate_key() -> Key {
        Key::generate()
    }

    /// Encrypt a message, returning an opaque self-describing token.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        self.cipher.encrypt(plaintext.as_bytes())
    }

    /// Decrypt a token produced by [`SecretFacade::encrypt`] under the
    /// same key.
    pub fn decrypt(&self, token: &str) -> Result<String> {
        let plaintext = self.cipher.decrypt(token)?;
        String::from_utf8(plaintext).map_err(|e| {
            SecretError::with_source(
                ErrorCategory::User,
                ErrorKind::InvalidToken,
                "token payload is not valid UTF-8 text",
                e,
            )
        })
    }

    /// Hash a password, returning an opaque PHC record.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        self.hasher.hash(password)
    }

    /// Verify a password against a hash record.
    pub fn verify_password(&self, record: &str, password: &str) -> Result<()> {
        self.hasher.verify(record, password)
    }
}
