//! Age envelope encryption for paste payloads.
//!
//! Payloads are sealed to the service recipient. Any failure to open an
//! envelope is reported as an integrity failure: wrong key, truncated header
//! and tampered body are indistinguishable to the caller.

use std::io::{Read, Write};
use std::iter;

use crate::crypto::key::ServerKey;
use crate::error::{PasteError, Result};

/// Encrypt `data` to the service recipient.
pub fn seal(key: &ServerKey, data: &[u8]) -> Result<Vec<u8>> {
    let recipient = key.recipient();
    let encryptor =
        age::Encryptor::with_recipients(iter::once(&recipient as &dyn age::Recipient))
            .map_err(|e| PasteError::Crypto(format!("Failed to create encryptor: {}", e)))?;

    let mut encrypted = Vec::new();
    let mut writer = encryptor
        .wrap_output(&mut encrypted)
        .map_err(|e| PasteError::Crypto(format!("Failed to create encryptor: {}", e)))?;

    writer
        .write_all(data)
        .map_err(|e| PasteError::Crypto(format!("Encryption write failed: {}", e)))?;

    writer
        .finish()
        .map_err(|e| PasteError::Crypto(format!("Encryption finish failed: {}", e)))?;

    Ok(encrypted)
}

/// Decrypt an envelope produced by [`seal`].
///
/// # Errors
///
/// Returns `PasteError::Integrity` if the envelope cannot be parsed,
/// was sealed to another recipient, or fails authentication.
pub fn open(key: &ServerKey, encrypted_data: &[u8]) -> Result<Vec<u8>> {
    let decryptor = age::Decryptor::new(encrypted_data)
        .map_err(|e| PasteError::Integrity(format!("Malformed envelope: {}", e)))?;

    let mut reader = decryptor
        .decrypt(iter::once(key.identity() as &dyn age::Identity))
        .map_err(|e| PasteError::Integrity(format!("Decryption failed: {}", e)))?;

    let mut decrypted = Vec::new();
    reader
        .read_to_end(&mut decrypted)
        .map_err(|e| PasteError::Integrity(format!("Failed to read decrypted data: {}", e)))?;

    Ok(decrypted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open_round_trip() {
        let key = ServerKey::generate();
        let plaintext = b"Hello, World! This is secret data.";

        let encrypted = seal(&key, plaintext).unwrap();
        assert_ne!(encrypted.as_slice(), plaintext);
        assert_eq!(open(&key, &encrypted).unwrap(), plaintext);
    }

    #[test]
    fn test_other_key_cannot_open() {
        let encrypted = seal(&ServerKey::generate(), b"secret data").unwrap();
        let result = open(&ServerKey::generate(), &encrypted);
        assert!(matches!(result, Err(PasteError::Integrity(_))));
    }

    #[test]
    fn test_corrupted_body_fails() {
        let key = ServerKey::generate();
        let mut encrypted = seal(&key, b"secret data").unwrap();
        let last = encrypted.len() - 1;
        encrypted[last] ^= 0xFF;

        assert!(matches!(open(&key, &encrypted), Err(PasteError::Integrity(_))));
    }

    #[test]
    fn test_garbage_is_integrity_failure() {
        let key = ServerKey::generate();
        assert!(matches!(
            open(&key, b"not an age file"),
            Err(PasteError::Integrity(_))
        ));
    }

    #[test]
    fn test_empty_plaintext() {
        let key = ServerKey::generate();
        let encrypted = seal(&key, b"").unwrap();
        assert!(open(&key, &encrypted).unwrap().is_empty());
    }
}
