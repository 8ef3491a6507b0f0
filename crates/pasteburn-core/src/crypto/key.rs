//! Process-level encryption key.
//!
//! Every paste is encrypted to a single age X25519 identity owned by the
//! running service. Confidentiality at rest therefore never depends on the
//! submitter choosing a passphrase.

use std::str::FromStr;

use age::secrecy::{ExposeSecret, SecretString};
use age::x25519;
use zeroize::Zeroizing;

use crate::error::{PasteError, Result};

/// The service's age identity.
#[derive(Clone)]
pub struct ServerKey {
    identity: x25519::Identity,
}

impl ServerKey {
    /// Generate a fresh random identity.
    pub fn generate() -> Self {
        Self {
            identity: x25519::Identity::generate(),
        }
    }

    /// Parse an `AGE-SECRET-KEY-1...` string.
    ///
    /// # Errors
    ///
    /// Returns `PasteError::Config` if the string is not a valid identity.
    pub fn parse(encoded: &str) -> Result<Self> {
        let identity = x25519::Identity::from_str(encoded.trim())
            .map_err(|e| PasteError::Config(format!("Invalid server identity: {}", e)))?;
        Ok(Self { identity })
    }

    /// Encode the identity for storage in configuration.
    ///
    /// # Security
    ///
    /// Avoid logging this value.
    pub fn to_secret_string(&self) -> SecretString {
        self.identity.to_string()
    }

    /// Encoded identity, wiped from memory on drop.
    pub fn encode(&self) -> Zeroizing<String> {
        Zeroizing::new(self.to_secret_string().expose_secret().to_string())
    }

    /// Public recipient string, safe to display.
    pub fn public_key(&self) -> String {
        self.recipient().to_string()
    }

    pub(crate) fn identity(&self) -> &x25519::Identity {
        &self.identity
    }

    pub(crate) fn recipient(&self) -> x25519::Recipient {
        self.identity.to_public()
    }
}

impl std::fmt::Debug for ServerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerKey")
            .field("recipient", &self.recipient().to_string())
            .field("identity", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for ServerKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_secret_string().expose_secret() == other.to_secret_string().expose_secret()
    }
}
