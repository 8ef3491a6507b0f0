//! Storage interface for paste records.
//!
//! The `PasteStore` trait defines what the lifecycle engine needs from a
//! backend. Every operation addresses a single record and is atomic at that
//! granularity; the engine never needs multi-record transactions.

use chrono::{DateTime, Utc};

use super::types::{PasteRecord, PasteUpdate, UpdateOutcome};
use crate::error::Result;

/// Persistence for paste records.
///
/// Implementations must ensure:
/// - At most one live record per short id
/// - Expired records are never returned
/// - Each operation fails with `PasteError::Connection` instead of blocking
///   past its deadline
pub trait PasteStore: Send + Sync {
    /// Insert a new record.
    ///
    /// # Errors
    ///
    /// - `PasteError::Validation` if the record is the empty sentinel
    /// - `PasteError::Conflict` if the short id is taken
    /// - `PasteError::Connection` on pool or backend failure
    fn create(&self, record: &PasteRecord) -> Result<()>;

    /// Fetch the live record for `short_id`.
    ///
    /// # Errors
    ///
    /// Returns `PasteError::NotFound` if no unexpired record matches.
    fn read(&self, short_id: &str, now: DateTime<Utc>) -> Result<PasteRecord>;

    /// Apply a partial mutation.
    ///
    /// # Errors
    ///
    /// - `PasteError::Validation` if the update sets nothing
    /// - `PasteError::NotFound` if no record matches the id and guards
    fn update(&self, short_id: &str, update: &PasteUpdate) -> Result<UpdateOutcome>;

    /// Remove a record. Returns whether one was removed; a missing record
    /// is not an error.
    fn delete(&self, short_id: &str) -> Result<bool>;

    /// Atomically fetch and remove the live record for `short_id`.
    ///
    /// Of several concurrent callers at most one receives the record.
    fn take(&self, short_id: &str, now: DateTime<Utc>) -> Result<PasteRecord>;

    /// Remove every record expired at `now`. Returns the number removed.
    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize>;

    /// Verify backend consistency.
    fn check_integrity(&self) -> Result<()>;

    /// Release backend resources. Later calls fail with
    /// `PasteError::Connection`.
    fn close(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_is_object_safe() {
        fn _accepts_dyn_store(_store: &dyn PasteStore) {}
    }
}
