//! # Pasteburn Core
//!
//! Core library for Pasteburn - a self-destructing, optionally
//! passphrase-protected paste service.
//!
//! This crate provides the paste lifecycle engine, its storage abstraction
//! and the cryptography behind it, independent of any HTTP or CLI surface.
//!
//! ## Architecture
//!
//! - **crypto**: payload encryption and passphrase verifiers
//! - **identity**: short public identifiers
//! - **policy**: expiry, burn and verification-hold decisions
//! - **storage**: `PasteStore` trait and the SQLite backend
//! - **engine**: ingestion, disclosure, verification and administration
//! - **collaborators**: content validation and CAPTCHA interfaces
//! - **status**: outcome mapping for adapters

pub mod collaborators;
pub mod crypto;
pub mod engine;
pub mod error;
pub mod fs;
pub mod identity;
pub mod policy;
pub mod status;
pub mod storage;

pub use collaborators::{AcceptAll, CaptchaVerifier, ContentValidator, PrintableText};
pub use crypto::ServerKey;
pub use engine::{
    decode_verification_reference, master_key_hash, ContentKind, DisclosedContent, Disclosure,
    EngineConfig, IngestOutcome, OutputFormat, PasteEngine, Submission,
};
pub use error::{PasteError, Result};
pub use identity::{IdAllocator, RandomIds};
pub use policy::{LifecyclePolicy, PolicyConfig};
pub use status::Status;
pub use storage::{PasteStore, SqlitePasteStore, StoreConfig};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
