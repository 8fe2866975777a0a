//! secrethub - symmetric message encryption and password hashing
//!
//! Generate a key, bind a [`SecretFacade`] to it, then encrypt/decrypt
//! short messages and hash/verify passwords. Encryption is authenticated
//! (XChaCha20-Poly1305); password hashing is memory-hard (Argon2id).

#![forbid(unsafe_code)]

pub mod cipher;
pub mod error;
pub mod facade;
pub mod input;
pub mod key;
pub mod password;

pub use error::{ErrorCategory, ErrorKind, Result, SecretError};
pub use facade::SecretFacade;
pub use key::Key;
pub use password::PasswordHasher;
