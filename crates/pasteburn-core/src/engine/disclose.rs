use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use super::{ContentKind, DisclosedContent, Disclosure, OutputFormat, PasteEngine};
use crate::error::{PasteError, Result};

impl PasteEngine {
    /// Return the content of a paste if the caller may see it.
    ///
    /// Checks run in order and stop at the first failure: the paste must
    /// exist and not be held, the passphrase must match when one is set,
    /// and the payload must decrypt. A burn-after-read paste is removed
    /// before its content is returned; of several concurrent readers only
    /// one receives it.
    ///
    /// # Errors
    ///
    /// - `PasteError::NotFound` if the paste is absent, expired, held, or
    ///   was burned by a concurrent reader
    /// - `PasteError::AuthFailure` on a wrong passphrase
    /// - `PasteError::Integrity` if the payload cannot be decrypted
    pub fn disclose(
        &self,
        short_id: &str,
        supplied_passphrase: &str,
        format: OutputFormat,
    ) -> Result<Disclosure> {
        if short_id.is_empty() {
            return Err(PasteError::NotFound);
        }

        let now = Utc::now();
        let record = self.store.read(short_id, now)?;
        if record.wait_verify {
            debug!(short_id, "Paste held for verification");
            return Err(PasteError::NotFound);
        }

        if record.pwd_is_set {
            if let Err(err) = self.cipher.verify(&record.password_hash, supplied_passphrase) {
                warn!(short_id, "Passphrase rejected");
                return Err(err);
            }
        }

        let plaintext = self.cipher.open(&record.payload.data)?;

        if record.read_then_burn {
            self.burn(short_id, now)?;
        }

        Ok(shape(plaintext, format))
    }

    /// Claim a burn-after-read paste for this reader.
    fn burn(&self, short_id: &str, now: DateTime<Utc>) -> Result<()> {
        match self.store.take(short_id, now) {
            Ok(_) => {
                info!(short_id, "Burned paste after disclosure");
                Ok(())
            }
            Err(PasteError::NotFound) => {
                debug!(short_id, "Paste burned by a concurrent reader");
                Err(PasteError::NotFound)
            }
            Err(err) => {
                warn!(short_id, error = %err, "Atomic burn failed, deleting instead");
                if let Err(err) = self.store.delete(short_id) {
                    error!(short_id, error = %err, "Failed to burn disclosed paste");
                }
                Ok(())
            }
        }
    }
}

fn shape(plaintext: Vec<u8>, format: OutputFormat) -> Disclosure {
    match format {
        OutputFormat::Raw => Disclosure {
            content: DisclosedContent::Raw(plaintext),
            kind: ContentKind::PlainText,
        },
        OutputFormat::Rendered => Disclosure {
            content: DisclosedContent::Rendered {
                text: String::from_utf8_lossy(&plaintext).into_owned(),
            },
            kind: ContentKind::Html,
        },
    }
}
