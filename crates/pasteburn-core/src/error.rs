//! Error types for paste lifecycle operations.
//!
//! The variants mirror the failure taxonomy that adapters translate into
//! status codes (see [`crate::status::Status`]). Variants that reach a client
//! carry no detail that would reveal whether a paste exists or which check
//! rejected the request.

use thiserror::Error;

/// Result type alias for paste operations.
pub type Result<T> = std::result::Result<T, PasteError>;

/// Core error type for paste operations.
#[derive(Debug, Error)]
pub enum PasteError {
    /// Bad or out-of-range input; never retried
    #[error("Validation error: {0}")]
    Validation(String),

    /// Wrong passphrase or master key
    #[error("Access denied")]
    AuthFailure,

    /// Refused by the content validator or the CAPTCHA verifier
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Paste absent, expired, or still held for verification
    #[error("Paste not found")]
    NotFound,

    /// Short id already taken by a live paste
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Backend unreachable, pool exhausted, or operation timed out
    #[error("Connection error: {0}")]
    Connection(String),

    /// Stored ciphertext or row cannot be authenticated or decoded
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Encryption or hashing machinery failed
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Invalid engine or store configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<rusqlite::Error> for PasteError {
    fn from(err: rusqlite::Error) -> Self {
        PasteError::Connection(format!("SQLite error: {}", err))
    }
}

impl From<r2d2::Error> for PasteError {
    fn from(err: r2d2::Error) -> Self {
        PasteError::Connection(format!("Pool error: {}", err))
    }
}
