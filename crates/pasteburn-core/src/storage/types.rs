//! Core data types for the storage layer.

use std::fmt;
use std::net::{IpAddr, Ipv6Addr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PasteError, Result};

/// Subtype tag for generic binary payloads.
pub const SUBTYPE_GENERIC: u8 = 0x00;

/// Ciphertext plus its content-subtype marker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncryptedPayload {
    pub data: Vec<u8>,
    pub subtype: u8,
}

impl EncryptedPayload {
    pub fn generic(data: Vec<u8>) -> Self {
        Self {
            data,
            subtype: SUBTYPE_GENERIC,
        }
    }

    /// BLAKE3 digest of the ciphertext bytes.
    pub fn digest(&self) -> blake3::Hash {
        blake3::hash(&self.data)
    }
}

impl PartialEq for EncryptedPayload {
    fn eq(&self, other: &Self) -> bool {
        // blake3::Hash equality is constant time.
        self.subtype == other.subtype
            && self.data.len() == other.data.len()
            && self.digest() == other.digest()
    }
}

impl Eq for EncryptedPayload {}

/// Submitter IP as a fixed-width number; IPv4 is stored IPv6-mapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmitterAddress(u128);

impl SubmitterAddress {
    pub fn from_ip(ip: IpAddr) -> Self {
        let v6 = match ip {
            IpAddr::V4(v4) => v4.to_ipv6_mapped(),
            IpAddr::V6(v6) => v6,
        };
        Self(u128::from(v6))
    }

    /// Parse a textual IPv4 or IPv6 address.
    pub fn parse(raw: &str) -> Result<Self> {
        let ip: IpAddr = raw
            .trim()
            .parse()
            .map_err(|_| PasteError::Validation("Invalid client address".to_string()))?;
        Ok(Self::from_ip(ip))
    }

    pub fn from_be_bytes(bytes: [u8; 16]) -> Self {
        Self(u128::from_be_bytes(bytes))
    }

    pub fn to_be_bytes(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    pub fn as_u128(self) -> u128 {
        self.0
    }

    pub fn to_ip(self) -> IpAddr {
        let v6 = Ipv6Addr::from(self.0);
        match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => IpAddr::V6(v6),
        }
    }
}

impl fmt::Display for SubmitterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ip())
    }
}

/// A stored paste.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PasteRecord {
    /// Public identifier
    pub short_id: String,

    /// Encrypted content
    pub payload: EncryptedPayload,

    /// Passphrase verifier; empty when no passphrase is set
    pub password_hash: String,

    /// True iff `password_hash` is non-empty
    pub pwd_is_set: bool,

    /// Provenance, never displayed
    pub submitter: SubmitterAddress,

    /// Unreadable at or after this instant
    pub expire_at: DateTime<Utc>,

    /// Held until an external verification succeeds
    pub wait_verify: bool,

    /// Deleted after the first successful disclosure
    pub read_then_burn: bool,
}

impl PasteRecord {
    /// Whether this equals the all-default sentinel.
    pub fn is_empty_sentinel(&self) -> bool {
        *self == PasteRecord::default()
    }

    /// Whether the record can no longer be read at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expire_at
    }
}

/// Equality ignores the submitter address; payloads compare by digest,
/// length and subtype.
impl PartialEq for PasteRecord {
    fn eq(&self, other: &Self) -> bool {
        self.wait_verify == other.wait_verify
            && self.read_then_burn == other.read_then_burn
            && self.pwd_is_set == other.pwd_is_set
            && self.short_id == other.short_id
            && self.expire_at == other.expire_at
            && self.password_hash == other.password_hash
            && self.payload == other.payload
    }
}

impl Eq for PasteRecord {}

/// Partial mutation applied by [`crate::storage::PasteStore::update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasteUpdate {
    pub wait_verify: Option<bool>,
    pub expire_at: Option<DateTime<Utc>>,

    /// Only match records whose `wait_verify` currently has this value
    pub require_wait_verify: Option<bool>,

    /// Only match records still live at this instant
    pub require_live_at: Option<DateTime<Utc>>,
}

impl PasteUpdate {
    /// The mutation that lifts a verification hold still open at `now`.
    pub fn lift_hold(now: DateTime<Utc>, expire_at: DateTime<Utc>) -> Self {
        Self {
            wait_verify: Some(false),
            expire_at: Some(expire_at),
            require_wait_verify: Some(true),
            require_live_at: Some(now),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.wait_verify.is_none() && self.expire_at.is_none()
    }
}

/// Counts reported by an update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: usize,
    pub modified: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> PasteRecord {
        PasteRecord {
            short_id: "abcdefghij".to_string(),
            payload: EncryptedPayload::generic(b"ciphertext".to_vec()),
            password_hash: String::new(),
            pwd_is_set: false,
            submitter: SubmitterAddress::parse("10.0.0.1").unwrap(),
            expire_at: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            wait_verify: false,
            read_then_burn: true,
        }
    }

    #[test]
    fn test_default_is_sentinel() {
        assert!(PasteRecord::default().is_empty_sentinel());
        assert!(!record().is_empty_sentinel());
    }

    #[test]
    fn test_equality_ignores_submitter() {
        let a = record();
        let mut b = record();
        b.submitter = SubmitterAddress::parse("::1").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_covers_payload_content_and_subtype() {
        let a = record();

        let mut b = record();
        b.payload.data = b"ciphertexu".to_vec();
        assert_ne!(a, b);

        let mut c = record();
        c.payload.subtype = 0x80;
        assert_ne!(a, c);
    }

    #[test]
    fn test_equality_covers_flags_and_expiry() {
        let a = record();

        let mut b = record();
        b.read_then_burn = false;
        assert_ne!(a, b);

        let mut c = record();
        c.expire_at = c.expire_at + chrono::Duration::milliseconds(1);
        assert_ne!(a, c);
    }

    #[test]
    fn test_submitter_round_trips_v4_and_v6() {
        for raw in ["192.168.1.20", "2001:db8::7"] {
            let addr = SubmitterAddress::parse(raw).unwrap();
            let restored = SubmitterAddress::from_be_bytes(addr.to_be_bytes());
            assert_eq!(restored.to_string(), raw);
        }
    }

    #[test]
    fn test_submitter_rejects_garbage() {
        assert!(matches!(
            SubmitterAddress::parse("not-an-ip"),
            Err(PasteError::Validation(_))
        ));
    }

    #[test]
    fn test_expiry_is_inclusive() {
        let rec = record();
        assert!(rec.is_expired(rec.expire_at));
        assert!(!rec.is_expired(rec.expire_at - chrono::Duration::milliseconds(1)));
    }
}
