//! Symmetric key generation and text encoding
//!
//! A key is 32 bytes drawn from the OS CSPRNG. Its external form is
//! URL-safe base64 with padding: 44 printable characters, safe to store
//! in an environment variable or paste into a shell.

use std::fmt;
use std::str::FromStr;

use base64::{Engine, engine::general_purpose::URL_SAFE};
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::ZeroizeOnDrop;

use crate::error::{ErrorCategory, ErrorKind, SecretError};

/// Length of key material in bytes
pub const KEY_LEN: usize = 32;

/// A symmetric encryption key.
///
/// The key material is wiped from memory when the key is dropped. The
/// text form is obtained with [`Key::encode`] and parsed back with
/// `str::parse`; the crate never persists or transmits keys on its own.
#[derive(Clone, ZeroizeOnDrop)]
pub struct Key {
    bytes: [u8; KEY_LEN],
}

impl Key {
    /// Generate a fresh key from the OS CSPRNG.
    pub fn generate() -> Key {
        let mut bytes = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Key { bytes }
    }

    /// The URL-safe base64 text form of the key (44 characters).
    pub fn encode(&self) -> String {
        URL_SAFE.encode(self.bytes)
    }

    /// Raw key material.
    ///
    /// Avoid storing or logging this value. Use only for immediate
    /// cipher construction.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl FromStr for Key {
    type Err = SecretError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = URL_SAFE.decode(s).map_err(|e| {
            SecretError::with_source(
                ErrorCategory::User,
                ErrorKind::InvalidKey,
                format!("key base64 decoding failed: {}", e),
                e,
            )
        })?;

        let bytes: [u8; KEY_LEN] = decoded.as_slice().try_into().map_err(|_| {
            SecretError::new(
                ErrorCategory::User,
                ErrorKind::InvalidKey,
                format!(
                    "key must decode to exactly {} bytes, got {}",
                    KEY_LEN,
                    decoded.len()
                ),
            )
        })?;

        Ok(Key { bytes })
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key").field("bytes", &"[REDACTED]").finish()
    }
}
