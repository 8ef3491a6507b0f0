//! Short public identifiers.
//!
//! Ids are 10 symbols from a 64-symbol URL-safe alphabet (60 bits). The
//! allocator does not consult the store; a duplicate is caught by the
//! store's uniqueness constraint on create.

use rand::Rng;

/// URL-safe alphabet, one symbol per 6 bits.
const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Length of every generated id.
pub const SHORT_ID_LENGTH: usize = 10;

/// Source of new paste ids.
pub trait IdAllocator: Send + Sync {
    fn new_id(&self) -> String;
}

/// Allocator backed by the thread-local OS-seeded RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdAllocator for RandomIds {
    fn new_id(&self) -> String {
        new_id()
    }
}

/// Generate a fresh id.
pub fn new_id() -> String {
    let mut rng = rand::rng();
    (0..SHORT_ID_LENGTH)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Whether `id` has the shape of a generated id.
pub fn is_well_formed(id: &str) -> bool {
    id.len() == SHORT_ID_LENGTH && id.bytes().all(|b| ALPHABET.contains(&b))
}
