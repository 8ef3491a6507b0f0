use chrono::{DateTime, Utc};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use super::PasteEngine;
use crate::error::{PasteError, Result};

/// Credential an operator presents for administrative deletes during the
/// UTC hour containing `at`.
///
/// This is the lowercase hex BLAKE3 digest of the master key followed by
/// the hour stamp `YYYY-MM-DDTHH`, so a captured value expires within the
/// hour.
pub fn master_key_hash(master_key: &str, at: DateTime<Utc>) -> String {
    let stamp = at.format("%Y-%m-%dT%H").to_string();
    let mut hasher = blake3::Hasher::new();
    hasher.update(master_key.as_bytes());
    hasher.update(stamp.as_bytes());
    hasher.finalize().to_hex().to_string()
}

impl PasteEngine {
    /// Delete a paste regardless of its lifecycle state.
    ///
    /// Returns whether a paste was removed.
    ///
    /// # Errors
    ///
    /// Returns `PasteError::AuthFailure` if no master key is configured or
    /// `presented_hash` does not match the current hour's credential.
    pub fn admin_delete(&self, presented_hash: &str, short_id: &str) -> Result<bool> {
        let master_key = match self.config.master_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => {
                warn!("Administrative delete refused: no master key configured");
                return Err(PasteError::AuthFailure);
            }
        };

        let presented = presented_hash.trim().to_ascii_lowercase();
        if presented.is_empty() {
            return Err(PasteError::AuthFailure);
        }

        let expected = master_key_hash(master_key, Utc::now());
        if !bool::from(expected.as_bytes().ct_eq(presented.as_bytes())) {
            warn!(short_id, "Administrative delete refused: bad credential");
            return Err(PasteError::AuthFailure);
        }

        let removed = self.store.delete(short_id)?;
        info!(short_id, removed, "Administrative delete");
        Ok(removed)
    }
}
