use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to the user's
    /// input, such as a refusal inside one of the cryptographic crates.
    Internal,

    /// The user provided invalid input or performed an action that is
    /// unsupported or impossible to complete.
    User,
}

/// Condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Key text is malformed or does not decode to exactly 32 bytes.
    InvalidKey,
    /// Ciphertext token is malformed, truncated, uses an unsupported
    /// version, was produced under a different key, or has been tampered
    /// with.
    InvalidToken,
    /// Password hash record is malformed or uses an unsupported
    /// algorithm or version.
    InvalidRecord,
    /// The candidate password does not match the hash record.
    VerifyMismatch,
    /// The AEAD refused to seal the message.
    EncryptionFailed,
    /// Argon2 parameter construction or hashing failed.
    HashingFailed,
    /// A password or confirmation could not be obtained from the
    /// configured reader.
    InputUnavailable,
    /// Interaction with stdin/stdout or the terminal failed.
    Io,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct SecretError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Specific condition tag. Every failure in this crate is one of the
    /// enumerated kinds.
    pub kind: ErrorKind,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl SecretError {
    /// Creates a new error with a category, kind, and display message.
    pub fn new(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that retains the originating source error.
    pub fn with_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind,
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// The user-facing message carried by the error.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SecretError>;
