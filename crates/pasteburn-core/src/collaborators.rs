//! Interfaces to services the engine consults but does not own.

use crate::error::Result;

/// Pass/fail check on submitted bytes, consulted when abuse detection is on.
pub trait ContentValidator: Send + Sync {
    fn is_acceptable(&self, content: &[u8]) -> bool;
}

/// Accepts every payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl ContentValidator for AcceptAll {
    fn is_acceptable(&self, _content: &[u8]) -> bool {
        true
    }
}

/// Accepts only UTF-8 text without NUL bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintableText;

impl ContentValidator for PrintableText {
    fn is_acceptable(&self, content: &[u8]) -> bool {
        !content.contains(&0) && std::str::from_utf8(content).is_ok()
    }
}

/// Human-verification check for a token presented from `client_ip`.
///
/// Returns `Ok(false)` when the token is refused and `Err` when the
/// verification service could not be reached.
pub trait CaptchaVerifier: Send + Sync {
    fn verify(&self, token: &str, client_ip: &str) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_all() {
        assert!(AcceptAll.is_acceptable(&[0, 159, 146, 150]));
        assert!(AcceptAll.is_acceptable(b""));
    }

    #[test]
    fn test_printable_text() {
        assert!(PrintableText.is_acceptable("héllo\nworld".as_bytes()));
        assert!(!PrintableText.is_acceptable(b"nul\0byte"));
        assert!(!PrintableText.is_acceptable(&[0xff, 0xfe]));
    }

    #[test]
    fn test_traits_are_object_safe() {
        struct Never;

        impl CaptchaVerifier for Never {
            fn verify(&self, _token: &str, _client_ip: &str) -> Result<bool> {
                Ok(false)
            }
        }

        let validators: Vec<Box<dyn ContentValidator>> =
            vec![Box::new(AcceptAll), Box::new(PrintableText)];
        assert_eq!(validators.len(), 2);

        let verifier: &dyn CaptchaVerifier = &Never;
        assert!(!verifier.verify("token", "127.0.0.1").unwrap());
    }
}
