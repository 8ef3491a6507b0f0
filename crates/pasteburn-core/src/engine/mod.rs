//! Paste lifecycle engine.
//!
//! `PasteEngine` ties the pieces together:
//! - Ingestion: validate, decide lifecycle, encrypt, allocate an id, store
//! - Disclosure: fetch, authorize, decrypt, burn when required
//! - Verification: lift the hold on a paste once a CAPTCHA passed
//! - Administration: delete by master key, purge expired records
//!
//! The engine keeps no mutable state between calls. It is `Send + Sync`
//! and meant to be shared by every request worker of a process.

mod admin;
mod disclose;
mod ingest;
mod verify;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::collaborators::{AcceptAll, ContentValidator};
use crate::crypto::{PasteCipher, ServerKey};
use crate::error::{PasteError, Result};
use crate::identity::{IdAllocator, RandomIds};
use crate::policy::{LifecyclePolicy, PolicyConfig};
use crate::storage::PasteStore;

pub use admin::master_key_hash;
pub use verify::{decode_verification_reference, verification_redirect};

/// Default upper bound on a submitted payload (1 MiB).
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

/// Engine settings.
#[derive(Clone)]
pub struct EngineConfig {
    /// Public host used to build paste URLs
    pub host: String,

    pub policy: PolicyConfig,

    /// Hold every new paste until a CAPTCHA passes
    pub captcha_enabled: bool,

    /// Run submissions through the content validator
    pub detect_abuse: bool,

    pub max_payload_bytes: usize,

    /// Shared secret for administrative deletes; unset disables them
    pub master_key: Option<Zeroizing<String>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            policy: PolicyConfig::default(),
            captcha_enabled: false,
            detect_abuse: false,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            master_key: None,
        }
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("host", &self.host)
            .field("policy", &self.policy)
            .field("captcha_enabled", &self.captcha_enabled)
            .field("detect_abuse", &self.detect_abuse)
            .field("max_payload_bytes", &self.max_payload_bytes)
            .field("master_key", &self.master_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// A paste as handed over by an adapter.
#[derive(Clone, Default)]
pub struct Submission {
    /// Access passphrase; empty for none
    pub password: String,

    /// `None` when omitted; `Some(0)` requests burn-after-read
    pub requested_expire_hours: Option<i64>,

    pub content: Vec<u8>,

    /// Textual IPv4 or IPv6 address of the submitter
    pub client_ip: String,
}

impl fmt::Debug for Submission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Submission")
            .field("password_set", &!self.password.is_empty())
            .field("requested_expire_hours", &self.requested_expire_hours)
            .field("content_len", &self.content.len())
            .field("client_ip", &self.client_ip)
            .finish()
    }
}

/// Result of a successful ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestOutcome {
    /// Paste is live at `url`
    Published { url: String },

    /// Paste is held; the client must verify at `redirect`
    VerificationRequired { redirect: String },
}

/// Requested shape of disclosed content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Raw,
    #[default]
    Rendered,
}

impl FromStr for OutputFormat {
    type Err = PasteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(OutputFormat::Raw),
            "" | "rendered" => Ok(OutputFormat::Rendered),
            other => Err(PasteError::Validation(format!(
                "Unknown output format: {}",
                other
            ))),
        }
    }
}

/// Media kind of disclosed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    PlainText,
    Html,
}

impl ContentKind {
    pub fn mime(self) -> &'static str {
        match self {
            ContentKind::PlainText => "text/plain; charset=utf-8",
            ContentKind::Html => "text/html; charset=utf-8",
        }
    }
}

/// Decrypted content, shaped for the caller.
#[derive(Clone, PartialEq, Eq)]
pub enum DisclosedContent {
    /// Exact plaintext bytes
    Raw(Vec<u8>),

    /// Text for an external renderer
    Rendered { text: String },
}

impl DisclosedContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            DisclosedContent::Raw(bytes) => bytes,
            DisclosedContent::Rendered { text } => text.as_bytes(),
        }
    }
}

impl fmt::Debug for DisclosedContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisclosedContent::Raw(bytes) => write!(f, "Raw({} bytes)", bytes.len()),
            DisclosedContent::Rendered { text } => write!(f, "Rendered({} bytes)", text.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disclosure {
    pub content: DisclosedContent,
    pub kind: ContentKind,
}

/// The paste lifecycle engine.
pub struct PasteEngine {
    store: Arc<dyn PasteStore>,
    cipher: PasteCipher,
    policy: LifecyclePolicy,
    config: EngineConfig,
    validator: Box<dyn ContentValidator>,
    ids: Box<dyn IdAllocator>,
}

impl PasteEngine {
    /// Build an engine over an established store.
    ///
    /// # Errors
    ///
    /// Returns `PasteError::Config` if the policy, host or size limit is
    /// invalid.
    pub fn new(store: Arc<dyn PasteStore>, key: ServerKey, config: EngineConfig) -> Result<Self> {
        let policy = LifecyclePolicy::new(config.policy)?;
        if config.host.trim().is_empty() {
            return Err(PasteError::Config("Host cannot be empty".to_string()));
        }
        if config.max_payload_bytes == 0 {
            return Err(PasteError::Config(
                "max_payload_bytes must be positive".to_string(),
            ));
        }

        Ok(Self {
            store,
            cipher: PasteCipher::new(key),
            policy,
            config,
            validator: Box::new(AcceptAll),
            ids: Box::new(RandomIds),
        })
    }

    /// Replace the content validator used when abuse detection is on.
    pub fn with_validator(mut self, validator: impl ContentValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    /// Replace the id source.
    pub fn with_id_allocator(mut self, ids: impl IdAllocator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Public URL of a live paste.
    pub fn public_url(&self, short_id: &str) -> String {
        format!(
            "https://{}/{}",
            self.config.host.trim().trim_end_matches('/'),
            short_id
        )
    }

    /// Remove every expired paste. Returns the number removed.
    pub fn purge_expired(&self) -> Result<usize> {
        self.store.purge_expired(Utc::now())
    }

    /// Check the backing store for corruption.
    pub fn check(&self) -> Result<()> {
        self.store.check_integrity()
    }

    /// Tear down the store connection.
    pub fn close(&self) {
        self.store.close();
    }
}

impl fmt::Debug for PasteEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasteEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("raw".parse::<OutputFormat>().unwrap(), OutputFormat::Raw);
        assert_eq!("RAW".parse::<OutputFormat>().unwrap(), OutputFormat::Raw);
        assert_eq!("".parse::<OutputFormat>().unwrap(), OutputFormat::Rendered);
        assert!(matches!(
            "pdf".parse::<OutputFormat>(),
            Err(PasteError::Validation(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = EngineConfig {
            master_key: Some(Zeroizing::new("hunter2".to_string())),
            ..EngineConfig::default()
        };
        assert!(!format!("{:?}", config).contains("hunter2"));

        let submission = Submission {
            password: "swordfish".to_string(),
            content: b"top secret".to_vec(),
            ..Submission::default()
        };
        let rendered = format!("{:?}", submission);
        assert!(!rendered.contains("swordfish"));
        assert!(!rendered.contains("top secret"));
    }

    #[test]
    fn test_ingest_outcome_serializes_with_status_tag() {
        let outcome = IngestOutcome::Published {
            url: "https://example.org/abc".to_string(),
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(
            json,
            r#"{"status":"published","url":"https://example.org/abc"}"#
        );
    }
}
