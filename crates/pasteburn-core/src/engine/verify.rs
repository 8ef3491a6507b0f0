use base64::alphabet;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use chrono::Utc;
use tracing::{info, warn};

use super::PasteEngine;
use crate::collaborators::CaptchaVerifier;
use crate::error::{PasteError, Result};
use crate::storage::PasteUpdate;

/// URL-safe decoder that tolerates clients re-adding padding.
const VERIFY_ID: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Where a client is sent to verify a held paste.
pub fn verification_redirect(short_id: &str) -> String {
    format!("/showVerify?id={}", URL_SAFE_NO_PAD.encode(short_id))
}

/// Recover the paste id from a verification reference.
///
/// Accepts the encoded value alone or the whole redirect path.
pub fn decode_verification_reference(reference: &str) -> Result<String> {
    let reference = reference.trim();
    let encoded = match reference.split_once("?id=") {
        Some((_, encoded)) => encoded,
        None => reference,
    };
    let bytes = VERIFY_ID
        .decode(encoded)
        .map_err(|_| PasteError::Validation("Malformed paste reference".to_string()))?;
    let short_id = String::from_utf8(bytes)
        .map_err(|_| PasteError::Validation("Malformed paste reference".to_string()))?;
    if short_id.is_empty() {
        return Err(PasteError::Validation("Empty paste reference".to_string()));
    }
    Ok(short_id)
}

impl PasteEngine {
    /// Lift the verification hold on a paste.
    ///
    /// Only a paste still on hold and unexpired matches, so the transition
    /// happens at most once. The new expiry is the default lifetime from
    /// now; a custom lifetime requested at submission is not restored.
    ///
    /// # Errors
    ///
    /// Returns `PasteError::NotFound` if no held, live paste has this id.
    pub fn confirm(&self, short_id: &str) -> Result<()> {
        let now = Utc::now();
        let update = PasteUpdate::lift_hold(now, self.policy.confirmed_expiry(now));
        let outcome = self.store.update(short_id, &update)?;
        info!(
            short_id,
            modified = outcome.modified,
            "Lifted verification hold"
        );
        Ok(())
    }

    /// Check a CAPTCHA token, then confirm the paste it was issued for.
    ///
    /// `encoded_id` is the reference from [`verification_redirect`].
    /// Returns the public URL of the now-live paste.
    ///
    /// # Errors
    ///
    /// - `PasteError::Rejected` if verification is disabled or the token
    ///   is refused
    /// - `PasteError::Validation` for a malformed reference or missing
    ///   token or address
    /// - `PasteError::Connection` if the verifier is unreachable
    /// - `PasteError::NotFound` as for [`PasteEngine::confirm`]
    pub fn verify_and_confirm(
        &self,
        encoded_id: &str,
        token: &str,
        client_ip: &str,
        verifier: &dyn CaptchaVerifier,
    ) -> Result<String> {
        if !self.config.captcha_enabled {
            return Err(PasteError::Rejected(
                "Verification is not enabled".to_string(),
            ));
        }
        let short_id = decode_verification_reference(encoded_id)?;
        if client_ip.trim().is_empty() {
            return Err(PasteError::Validation("Missing client address".to_string()));
        }
        if token.trim().is_empty() {
            return Err(PasteError::Validation(
                "Missing verification token".to_string(),
            ));
        }

        match verifier.verify(token, client_ip) {
            Ok(true) => {}
            Ok(false) => {
                warn!(short_id = %short_id, "Verification token refused");
                return Err(PasteError::Rejected("Verification failed".to_string()));
            }
            Err(err) => {
                return Err(PasteError::Connection(format!(
                    "Verification service unavailable: {}",
                    err
                )));
            }
        }

        self.confirm(&short_id)?;
        Ok(self.public_url(&short_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_reference_decodes_back() {
        let redirect = verification_redirect("Ab3_-x9Zq0");
        let encoded = redirect.trim_start_matches("/showVerify?id=");
        assert!(!encoded.contains('='));
        assert_eq!(decode_verification_reference(encoded).unwrap(), "Ab3_-x9Zq0");
    }

    #[test]
    fn test_full_redirect_accepted() {
        let redirect = verification_redirect("Zz9-_aaaaa");
        assert_eq!(decode_verification_reference(&redirect).unwrap(), "Zz9-_aaaaa");
    }

    #[test]
    fn test_padded_reference_accepted() {
        assert_eq!(decode_verification_reference("YWJj").unwrap(), "abc");
        assert_eq!(decode_verification_reference("YWI=").unwrap(), "ab");
        assert_eq!(decode_verification_reference("YWI").unwrap(), "ab");
    }

    #[test]
    fn test_bad_references_rejected() {
        for bad in ["", "!!!", "_w"] {
            assert!(
                matches!(decode_verification_reference(bad), Err(PasteError::Validation(_))),
                "{:?}",
                bad
            );
        }
    }
}
