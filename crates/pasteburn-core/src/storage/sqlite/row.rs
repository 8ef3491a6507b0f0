//! Paste row type for database queries.

use chrono::DateTime;
use rusqlite::Row;

use crate::error::{PasteError, Result};
use crate::storage::types::{EncryptedPayload, PasteRecord, SubmitterAddress};

/// Column list shared by every query that returns a full row.
pub const COLUMNS: &str = "short_id, payload, payload_subtype, passwd, pwd_is_set, user_ip, \
                           expire_at, wait_verify, read_then_burn";

/// Raw row data from the pastes table, before parsing into domain types.
#[derive(Debug)]
pub struct PasteRow {
    pub short_id: String,
    pub payload: Vec<u8>,
    pub payload_subtype: i64,
    pub passwd: String,
    pub pwd_is_set: bool,
    pub user_ip: Vec<u8>,
    pub expire_at: i64,
    pub wait_verify: bool,
    pub read_then_burn: bool,
}

impl PasteRow {
    /// Read a row selected with [`COLUMNS`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            short_id: row.get(0)?,
            payload: row.get(1)?,
            payload_subtype: row.get(2)?,
            passwd: row.get(3)?,
            pwd_is_set: row.get(4)?,
            user_ip: row.get(5)?,
            expire_at: row.get(6)?,
            wait_verify: row.get(7)?,
            read_then_burn: row.get(8)?,
        })
    }
}

impl From<&PasteRecord> for PasteRow {
    fn from(record: &PasteRecord) -> Self {
        Self {
            short_id: record.short_id.clone(),
            payload: record.payload.data.clone(),
            payload_subtype: i64::from(record.payload.subtype),
            passwd: record.password_hash.clone(),
            pwd_is_set: record.pwd_is_set,
            user_ip: record.submitter.to_be_bytes().to_vec(),
            expire_at: record.expire_at.timestamp_millis(),
            wait_verify: record.wait_verify,
            read_then_burn: record.read_then_burn,
        }
    }
}

impl TryFrom<PasteRow> for PasteRecord {
    type Error = PasteError;

    fn try_from(row: PasteRow) -> Result<Self> {
        let subtype = u8::try_from(row.payload_subtype).map_err(|_| {
            PasteError::Integrity(format!("Invalid payload subtype: {}", row.payload_subtype))
        })?;
        let user_ip: [u8; 16] = row.user_ip.as_slice().try_into().map_err(|_| {
            PasteError::Integrity(format!("Invalid address width: {}", row.user_ip.len()))
        })?;
        let expire_at = DateTime::from_timestamp_millis(row.expire_at)
            .ok_or_else(|| PasteError::Integrity(format!("Invalid expiry: {}", row.expire_at)))?;
        if row.pwd_is_set == row.passwd.is_empty() {
            return Err(PasteError::Integrity(
                "Password flag disagrees with verifier".to_string(),
            ));
        }

        Ok(PasteRecord {
            short_id: row.short_id,
            payload: EncryptedPayload {
                data: row.payload,
                subtype,
            },
            password_hash: row.passwd,
            pwd_is_set: row.pwd_is_set,
            submitter: SubmitterAddress::from_be_bytes(user_ip),
            expire_at,
            wait_verify: row.wait_verify,
            read_then_burn: row.read_then_burn,
        })
    }
}
