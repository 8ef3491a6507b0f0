//! Cryptographic operations for pastes.
//!
//! Two independent mechanisms protect a paste:
//! - **Age** (X25519): payload confidentiality, keyed by the service identity
//! - **Argon2id**: optional passphrase verifier for access control
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the paste database (ciphertext only, verifiers are one-way)
//! - Guessing the passphrase of a protected paste through the service
//!
//! We do NOT defend against:
//! - Compromise of the running service or its configured identity

pub mod key;
pub mod seal;
pub mod verifier;

pub use key::ServerKey;
pub use verifier::{hash_passphrase, verify_passphrase, UNSET_VERIFIER};

use crate::error::Result;

/// Output of [`PasteCipher::encrypt`].
#[derive(Debug, Clone)]
pub struct SealedPayload {
    /// Age envelope of the plaintext
    pub ciphertext: Vec<u8>,

    /// Passphrase verifier, or [`UNSET_VERIFIER`]
    pub verifier: String,
}

/// Encrypts and decrypts paste payloads with the service key.
#[derive(Debug, Clone)]
pub struct PasteCipher {
    key: ServerKey,
}

impl PasteCipher {
    pub fn new(key: ServerKey) -> Self {
        Self { key }
    }

    /// Seal `plaintext` and derive the verifier for `passphrase`.
    ///
    /// An empty passphrase still yields a sealed payload.
    pub fn encrypt(&self, plaintext: &[u8], passphrase: &str) -> Result<SealedPayload> {
        let ciphertext = seal::seal(&self.key, plaintext)?;
        let verifier = hash_passphrase(passphrase)?;
        Ok(SealedPayload {
            ciphertext,
            verifier,
        })
    }

    /// Check the passphrase, then open the payload.
    ///
    /// # Errors
    ///
    /// - `PasteError::AuthFailure` if `supplied` does not match `verifier`
    /// - `PasteError::Integrity` if the ciphertext cannot be opened
    pub fn decrypt(&self, ciphertext: &[u8], verifier: &str, supplied: &str) -> Result<Vec<u8>> {
        self.verify(verifier, supplied)?;
        self.open(ciphertext)
    }

    /// Access check only.
    pub fn verify(&self, verifier: &str, supplied: &str) -> Result<()> {
        verify_passphrase(verifier, supplied)
    }

    /// Open the payload without an access check.
    pub fn open(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        seal::open(&self.key, ciphertext)
    }
}
