//! Passphrase verifiers.
//!
//! A verifier is an Argon2id PHC string (`$argon2id$v=19$...`) with a random
//! salt. It controls access only; the payload key never derives from it.
//! The empty passphrase maps to the empty verifier, which marks a paste as
//! not password protected.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;

use crate::error::{PasteError, Result};

/// Verifier stored for pastes without an access passphrase.
pub const UNSET_VERIFIER: &str = "";

/// Argon2id parameters.
///
/// - Memory: 19 MB (19 * 1024 KB)
/// - Iterations: 2
/// - Parallelism: 1
const ARGON2_MEMORY_KB: u32 = 19 * 1024;
const ARGON2_ITERATIONS: u32 = 2;
const ARGON2_PARALLELISM: u32 = 1;

fn argon2() -> Result<Argon2<'static>> {
    let params = argon2::Params::new(
        ARGON2_MEMORY_KB,
        ARGON2_ITERATIONS,
        ARGON2_PARALLELISM,
        None,
    )
    .map_err(|e| PasteError::Crypto(format!("Failed to create Argon2 params: {}", e)))?;

    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

/// Hash a passphrase into a verifier.
///
/// Returns [`UNSET_VERIFIER`] for the empty passphrase.
pub fn hash_passphrase(passphrase: &str) -> Result<String> {
    if passphrase.is_empty() {
        return Ok(UNSET_VERIFIER.to_string());
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2()?
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| PasteError::Crypto(format!("Passphrase hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Check `supplied` against a stored verifier.
///
/// An unset verifier only accepts the empty passphrase.
///
/// # Errors
///
/// - `PasteError::AuthFailure` on mismatch
/// - `PasteError::Integrity` if the stored verifier is not a PHC string
pub fn verify_passphrase(verifier: &str, supplied: &str) -> Result<()> {
    if verifier == UNSET_VERIFIER {
        return if supplied.is_empty() {
            Ok(())
        } else {
            Err(PasteError::AuthFailure)
        };
    }

    let parsed = PasswordHash::new(verifier)
        .map_err(|e| PasteError::Integrity(format!("Stored verifier unreadable: {}", e)))?;

    // Parameters come from the PHC string, so older verifiers keep working.
    Argon2::default()
        .verify_password(supplied.as_bytes(), &parsed)
        .map_err(|_| PasteError::AuthFailure)
}
