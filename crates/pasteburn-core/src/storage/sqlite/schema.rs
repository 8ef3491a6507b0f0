//! Schema setup and consistency checks.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};

use crate::error::{PasteError, Result};

/// On-disk format written to the meta table.
pub const FORMAT_VERSION: &str = "1";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pastes (
    short_id TEXT PRIMARY KEY,
    payload BLOB NOT NULL,
    payload_subtype INTEGER NOT NULL DEFAULT 0,
    passwd TEXT NOT NULL DEFAULT '',
    pwd_is_set INTEGER NOT NULL,
    user_ip BLOB NOT NULL,
    expire_at INTEGER NOT NULL,
    wait_verify INTEGER NOT NULL,
    read_then_burn INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS pastes_expire_at ON pastes (expire_at);
"#;

/// Create tables on first use and confirm the format version.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA)?;
    tx.execute(
        "INSERT OR IGNORE INTO meta (key, value) VALUES ('format_version', ?1)",
        [FORMAT_VERSION],
    )?;
    tx.execute(
        "INSERT OR IGNORE INTO meta (key, value) VALUES ('created_at', ?1)",
        [Utc::now().to_rfc3339()],
    )?;

    let version: String = tx.query_row(
        "SELECT value FROM meta WHERE key = 'format_version'",
        [],
        |row| row.get(0),
    )?;
    if version != FORMAT_VERSION {
        return Err(PasteError::Config(format!(
            "Unsupported store format {} (expected {})",
            version, FORMAT_VERSION
        )));
    }

    tx.commit()?;
    Ok(())
}

/// Verify page structure, metadata and per-row invariants.
pub fn check(conn: &Connection) -> Result<()> {
    let integrity: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
    if integrity != "ok" {
        return Err(PasteError::Integrity(format!(
            "SQLite integrity check failed: {}",
            integrity
        )));
    }

    let version: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'format_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    if version.as_deref() != Some(FORMAT_VERSION) {
        return Err(PasteError::Integrity(
            "Metadata table missing format version".to_string(),
        ));
    }

    let flag_mismatch: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pastes WHERE pwd_is_set != (passwd != '')",
        [],
        |row| row.get(0),
    )?;
    if flag_mismatch > 0 {
        return Err(PasteError::Integrity(format!(
            "{} pastes have a password flag that disagrees with the verifier",
            flag_mismatch
        )));
    }

    let bad_address: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pastes WHERE length(user_ip) != 16",
        [],
        |row| row.get(0),
    )?;
    if bad_address > 0 {
        return Err(PasteError::Integrity(format!(
            "{} pastes have a malformed submitter address",
            bad_address
        )));
    }

    Ok(())
}
