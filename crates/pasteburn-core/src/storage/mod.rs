//! Storage abstraction for paste records.
//!
//! This module defines the `PasteStore` trait and the record types the
//! lifecycle engine persists.
//!
//! ## Architecture
//!
//! The engine only talks to `PasteStore`, so backends are swappable:
//! - SQLite in WAL mode behind a small connection pool
//! - In-memory or remote stores in tests and embedders
//!
//! ## Guarantees
//!
//! Backends are responsible for:
//! - Per-record atomicity, including the claim-and-delete used by burning
//! - Hiding expired records from every read path
//! - Bounded operation latency with a single retry on transient failure
//!
//! Payloads reach the store already encrypted; no backend ever sees
//! plaintext or passphrases.

pub mod sqlite;
pub mod traits;
pub mod types;

pub use sqlite::{SqlitePasteStore, StoreConfig};
pub use traits::PasteStore;
pub use types::{
    EncryptedPayload, PasteRecord, PasteUpdate, SubmitterAddress, UpdateOutcome, SUBTYPE_GENERIC,
};
