use chrono::Utc;
use tracing::{debug, info, warn};

use super::{verification_redirect, IngestOutcome, PasteEngine, Submission};
use crate::error::{PasteError, Result};
use crate::storage::{EncryptedPayload, PasteRecord, SubmitterAddress};

/// Ids tried before a collision is reported.
const MAX_ID_ATTEMPTS: u32 = 3;

impl PasteEngine {
    /// Accept a submission and persist it as a new paste.
    ///
    /// # Errors
    ///
    /// - `PasteError::Validation` for empty or oversized content, a bad
    ///   client address, or out-of-range expiry hours
    /// - `PasteError::Rejected` if abuse detection refuses the content
    /// - `PasteError::Conflict` if every generated id was already taken
    /// - `PasteError::Connection` on store failure
    pub fn ingest(&self, submission: Submission) -> Result<IngestOutcome> {
        if submission.content.is_empty() {
            return Err(PasteError::Validation("Paste content is empty".to_string()));
        }
        if submission.content.len() > self.config.max_payload_bytes {
            return Err(PasteError::Validation(format!(
                "Paste exceeds {} bytes",
                self.config.max_payload_bytes
            )));
        }
        let submitter = SubmitterAddress::parse(&submission.client_ip)?;

        if self.config.detect_abuse && !self.validator.is_acceptable(&submission.content) {
            warn!(
                content_len = submission.content.len(),
                "Submission refused by content validator"
            );
            return Err(PasteError::Rejected("Content refused".to_string()));
        }

        let decision = self.policy.decide(
            submission.requested_expire_hours,
            !submission.password.is_empty(),
            self.config.captcha_enabled,
            Utc::now(),
        )?;
        let sealed = self
            .cipher
            .encrypt(&submission.content, &submission.password)?;

        let mut record = PasteRecord {
            short_id: String::new(),
            payload: EncryptedPayload::generic(sealed.ciphertext),
            pwd_is_set: !sealed.verifier.is_empty(),
            password_hash: sealed.verifier,
            submitter,
            expire_at: decision.expire_at,
            wait_verify: decision.wait_verify,
            read_then_burn: decision.read_then_burn,
        };
        self.create_with_fresh_id(&mut record)?;

        info!(
            short_id = %record.short_id,
            expire_at = %record.expire_at,
            wait_verify = record.wait_verify,
            read_then_burn = record.read_then_burn,
            protected = record.pwd_is_set,
            "Accepted paste"
        );

        if record.wait_verify {
            Ok(IngestOutcome::VerificationRequired {
                redirect: verification_redirect(&record.short_id),
            })
        } else {
            Ok(IngestOutcome::Published {
                url: self.public_url(&record.short_id),
            })
        }
    }

    /// Insert `record` under a new id, regenerating it on collision.
    fn create_with_fresh_id(&self, record: &mut PasteRecord) -> Result<()> {
        let mut attempt = 1;
        loop {
            record.short_id = self.ids.new_id();
            match self.store.create(record) {
                Ok(()) => return Ok(()),
                Err(PasteError::Conflict(_)) if attempt < MAX_ID_ATTEMPTS => {
                    debug!(attempt, "Short id collision, regenerating");
                    attempt += 1;
                }
                Err(PasteError::Conflict(reason)) => {
                    warn!(attempts = attempt, "Giving up after repeated id collisions");
                    return Err(PasteError::Conflict(reason));
                }
                Err(err) => return Err(err),
            }
        }
    }
}
