//! Authenticated message encryption producing self-describing tokens
//!
//! This module seals messages with XChaCha20-Poly1305 under a caller
//! supplied 32-byte key. A token is URL-safe base64 (no padding) over the
//! binary layout:
//! - version: 1 byte (0x01)
//! - timestamp: 8 bytes (big-endian u64, seconds since the Unix epoch)
//! - nonce: 24 bytes
//! - sealed box: variable length (includes 16-byte Poly1305 MAC)
//!
//! The version/timestamp/nonce header is fed to the AEAD as associated
//! data, so no byte of a token sits outside the authentication envelope.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::{ErrorCategory, ErrorKind, Result, SecretError};
use crate::key::Key;

/// Token format version produced by this crate
pub const TOKEN_VERSION: u8 = 1;

/// Length of the timestamp field in bytes
const TIMESTAMP_LEN: usize = 8;

/// Length of nonce in bytes
const NONCE_LEN: usize = 24;

/// Length of the token header (version + timestamp + nonce)
const HEADER_LEN: usize = 1 + TIMESTAMP_LEN + NONCE_LEN;

/// Length of the Poly1305 MAC in bytes
const TAG_LEN: usize = 16;

/// Stateless authenticated encryption bound to a single key.
///
/// Instances built from the same key produce interoperable tokens.
pub struct AeadCipher {
    cipher: XChaCha20Poly1305,
}

impl AeadCipher {
    pub fn new(key: &Key) -> AeadCipher {
        AeadCipher {
            cipher: XChaCha20Poly1305::new(key.as_bytes().into()),
        }
    }

    /// Seal a message into a token using a random nonce.
    ///
    /// Two calls with identical plaintext produce different tokens.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        // A clock before the epoch stamps the token with zero.
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        self.encrypt_at(plaintext, timestamp, &nonce)
    }

    /// Seal a message with a provided timestamp and nonce.
    ///
    /// This function is ONLY for testing purposes to generate deterministic
    /// output. NEVER use this in production - always use `encrypt()` which
    /// generates a random nonce.
    pub fn encrypt_at(
        &self,
        plaintext: &[u8],
        timestamp: u64,
        nonce: &[u8; NONCE_LEN],
    ) -> Result<String> {
        let mut header = [0u8; HEADER_LEN];
        header[0] = TOKEN_VERSION;
        header[1..1 + TIMESTAMP_LEN].copy_from_slice(&timestamp.to_be_bytes());
        header[1 + TIMESTAMP_LEN..].copy_from_slice(nonce);

        let sealed_box = self
            .cipher
            .encrypt(
                XNonce::from_slice(nonce),
                Payload {
                    msg: plaintext,
                    aad: &header,
                },
            )
            .map_err(|_| {
                SecretError::new(
                    ErrorCategory::Internal,
                    ErrorKind::EncryptionFailed,
                    "AEAD refused to seal the message",
                )
            })?;

        let mut body = Vec::with_capacity(HEADER_LEN + sealed_box.len());
        body.extend_from_slice(&header);
        body.extend_from_slice(&sealed_box);

        Ok(URL_SAFE_NO_PAD.encode(body))
    }

    /// Open a token, returning the original message.
    ///
    /// Fails with `InvalidToken` if the token is malformed, truncated,
    /// uses an unsupported version, was produced under a different key,
    /// or has been tampered with.
    pub fn decrypt(&self, token: &str) -> Result<Vec<u8>> {
        let body = URL_SAFE_NO_PAD.decode(token).map_err(|e| {
            SecretError::with_source(
                ErrorCategory::User,
                ErrorKind::InvalidToken,
                format!("token base64 decoding failed: {}", e),
                e,
            )
        })?;

        if body.is_empty() {
            return Err(invalid_token("token is empty"));
        }

        if body[0] != TOKEN_VERSION {
            return Err(invalid_token(format!(
                "unsupported token version {}",
                body[0]
            )));
        }

        if body.len() < HEADER_LEN {
            return Err(invalid_token(
                "token likely truncated while reading the header",
            ));
        }

        if body.len() < HEADER_LEN + TAG_LEN {
            return Err(invalid_token(
                "token likely truncated while reading the sealed box",
            ));
        }

        let header = &body[..HEADER_LEN];
        let nonce = XNonce::from_slice(&header[1 + TIMESTAMP_LEN..]);
        let sealed_box = &body[HEADER_LEN..];

        self.cipher
            .decrypt(
                nonce,
                Payload {
                    msg: sealed_box,
                    aad: header,
                },
            )
            .map_err(|_| invalid_token("token corrupt, tampered with, or produced under a different key"))
    }
}

fn invalid_token(msg: impl Into<String>) -> SecretError {
    SecretError::new(ErrorCategory::User, ErrorKind::InvalidToken, msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> AeadCipher {
        AeadCipher::new(&Key::generate())
    }

    #[test]
    fn test_empty_plaintext() {
        let cipher = cipher();
        let token = cipher.encrypt(b"").unwrap();
        let decrypted = cipher.decrypt(&token).unwrap();
        assert_eq!(b"", &decrypted[..]);
    }

    #[test]
    fn test_small_plaintext() {
        let cipher = cipher();
        let token = cipher.encrypt(b"hello").unwrap();
        let decrypted = cipher.decrypt(&token).unwrap();
        assert_eq!(b"hello", &decrypted[..]);
    }

    #[test]
    fn test_all_byte_values() {
        let cipher = cipher();
        let plaintext: Vec<u8> = (0..=255).collect();
        let token = cipher.encrypt(&plaintext).unwrap();
        let decrypted = cipher.decrypt(&token).unwrap();
        assert_eq!(plaintext, decrypted);
    }

    #[test]
    fn test_large_plaintext() {
        let cipher = cipher();
        let plaintext = vec![0x42u8; 128 * 1024]; // 128KB
        let token = cipher.encrypt(&plaintext).unwrap();
        let decrypted = cipher.decrypt(&token).unwrap();
        assert_eq!(plaintext, decrypted);
    }

    #[test]
    fn test_encryption_not_deterministic() {
        let cipher = cipher();
        let t1 = cipher.encrypt(b"hello world").unwrap();
        let t2 = cipher.encrypt(b"hello world").unwrap();
        assert_ne!(t1, t2);

        assert_eq!(cipher.decrypt(&t1).unwrap(), b"hello world");
        assert_eq!(cipher.decrypt(&t2).unwrap(), b"hello world");
    }

    #[test]
    fn test_deterministic_encryption() {
        let cipher = cipher();
        let nonce = [2u8; NONCE_LEN];

        let t1 = cipher.encrypt_at(b"hello world", 1_700_000_000, &nonce).unwrap();
        let t2 = cipher.encrypt_at(b"hello world", 1_700_000_000, &nonce).unwrap();

        // Same timestamp/nonce produces an identical token
        assert_eq!(t1, t2);
        assert_eq!(cipher.decrypt(&t1).unwrap(), b"hello world");
    }

    #[test]
    fn test_different_nonce_different_token() {
        let cipher = cipher();
        let t1 = cipher.encrypt_at(b"hello", 0, &[2u8; NONCE_LEN]).unwrap();
        let t2 = cipher.encrypt_at(b"hello", 0, &[3u8; NONCE_LEN]).unwrap();
        assert_ne!(t1, t2);
    }

    #[test]
    fn test_token_layout() {
        let cipher = cipher();
        let token = cipher.encrypt_at(b"hi", 0x0102030405060708, &[7u8; NONCE_LEN]).unwrap();
        let body = URL_SAFE_NO_PAD.decode(&token).unwrap();

        assert_eq!(body[0], TOKEN_VERSION);
        assert_eq!(&body[1..9], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(&body[9..33], &[7u8; NONCE_LEN]);
        assert_eq!(body.len(), HEADER_LEN + 2 + TAG_LEN);
    }

    #[test]
    fn test_wrong_key_fails() {
        let token = cipher().encrypt(b"secret data").unwrap();
        let other = cipher();

        let err = other.decrypt(&token).expect_err("expected auth failure");
        assert_eq!(err.kind, ErrorKind::InvalidToken);
    }

    #[test]
    fn test_flipping_any_byte_fails() {
        let cipher = cipher();
        let token = cipher.encrypt(b"integrity matters").unwrap();
        let mut body = URL_SAFE_NO_PAD.decode(&token).unwrap();

        for i in 0..body.len() {
            body[i] ^= 0x01;
            let forged = URL_SAFE_NO_PAD.encode(&body);
            let err = cipher
                .decrypt(&forged)
                .expect_err("expected flipped byte to be rejected");
            assert_eq!(err.kind, ErrorKind::InvalidToken, "byte index {}", i);
            body[i] ^= 0x01;
        }
    }

    #[test]
    fn test_trailing_data_fails() {
        let cipher = cipher();
        let token = cipher.encrypt(b"hello").unwrap();
        let mut body = URL_SAFE_NO_PAD.decode(&token).unwrap();
        body.push(0xFF);

        let forged = URL_SAFE_NO_PAD.encode(&body);
        let err = cipher.decrypt(&forged).expect_err("expected trailing data rejection");
        assert_eq!(err.kind, ErrorKind::InvalidToken);
    }

    #[test]
    fn test_empty_token() {
        let err = cipher().decrypt("").expect_err("expected empty token error");
        assert_eq!(err.kind, ErrorKind::InvalidToken);
        assert!(err.message().contains("empty"));
    }

    #[test]
    fn test_bad_base64() {
        let err = cipher()
            .decrypt("not!base64")
            .expect_err("expected base64 decode error");
        assert_eq!(err.kind, ErrorKind::InvalidToken);
    }

    #[test]
    fn test_padding_rejected() {
        let err = cipher().decrypt("AQ==").expect_err("expected padding rejection");
        assert_eq!(err.kind, ErrorKind::InvalidToken);
    }

    #[test]
    fn test_unsupported_version() {
        // Single byte 0x02: a version from the future.
        let err = cipher().decrypt("Ag").expect_err("expected version error");
        assert_eq!(err.kind, ErrorKind::InvalidToken);
        assert!(err.message().contains("version"));
    }

    #[test]
    fn test_truncated_header() {
        // Version byte plus a partial timestamp.
        let body = [TOKEN_VERSION, 0, 0, 0];
        let err = cipher()
            .decrypt(&URL_SAFE_NO_PAD.encode(body))
            .expect_err("expected truncated header error");
        assert_eq!(err.kind, ErrorKind::InvalidToken);
        assert!(err.message().contains("header"));
    }

    #[test]
    fn test_truncated_sealed_box() {
        // Full header but nothing left for the MAC.
        let mut body = vec![0u8; HEADER_LEN];
        body[0] = TOKEN_VERSION;
        let err = cipher()
            .decrypt(&URL_SAFE_NO_PAD.encode(body))
            .expect_err("expected truncated sealed box error");
        assert_eq!(err.kind, ErrorKind::InvalidToken);
        assert!(err.message().contains("sealed box"));
    }

    #[test]
    fn test_minimum_length_forgery_fails() {
        // Correct version and plausible length, but a body this cipher
        // never produced.
        let mut body = vec![0u8; HEADER_LEN + TAG_LEN];
        body[0] = TOKEN_VERSION;
        let err = cipher()
            .decrypt(&URL_SAFE_NO_PAD.encode(body))
            .expect_err("expected authentication failure");
        assert_eq!(err.kind, ErrorKind::InvalidToken);
    }
}
