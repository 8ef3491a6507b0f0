//! SQLite storage backend.
//!
//! Records live in a WAL-mode SQLite file shared through an r2d2 pool.
//! Every operation is a single statement or an IMMEDIATE transaction, so
//! per-record atomicity comes from SQLite's write lock. A checkout that
//! times out, or a statement that hits a busy database, is retried once
//! if the operation's deadline has not passed.

mod row;
mod schema;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::ToSql;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{PasteError, Result};
use crate::storage::traits::PasteStore;
use crate::storage::types::{PasteRecord, PasteUpdate, UpdateOutcome};

use row::{PasteRow, COLUMNS};

pub use schema::FORMAT_VERSION;

type SqlitePool = Pool<SqliteConnectionManager>;

/// Attempts per operation, including the first.
const MAX_ATTEMPTS: u32 = 2;

/// Connection settings for [`SqlitePasteStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Database file
    pub path: PathBuf,

    /// Connections kept open while idle
    pub min_idle: u32,

    /// Upper bound on open connections
    pub max_size: u32,

    /// Deadline for a checkout or a statement waiting on a lock
    pub op_timeout: Duration,

    /// Deadline for the initial liveness probe
    pub connect_timeout: Duration,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(PasteError::Config(
                "Pool max_size must be at least 1".to_string(),
            ));
        }
        if self.min_idle > self.max_size {
            return Err(PasteError::Config(
                "Pool min_idle cannot exceed max_size".to_string(),
            ));
        }
        if self.op_timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err(PasteError::Config(
                "Store timeouts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("pasteburn.db"),
            min_idle: 2,
            max_size: 4,
            op_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Failure inside one attempt, kept raw until retry is decided.
enum Failure {
    Checkout(r2d2::Error),
    Sqlite(rusqlite::Error),
    Paste(PasteError),
}

impl Failure {
    fn is_transient(&self) -> bool {
        match self {
            Failure::Checkout(_) => true,
            Failure::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }

    fn into_error(self, op: &str) -> PasteError {
        match self {
            Failure::Checkout(err) => {
                PasteError::Connection(format!("{}: connection unavailable: {}", op, err))
            }
            Failure::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                PasteError::Conflict("Short id already in use".to_string())
            }
            Failure::Sqlite(err) => PasteError::Connection(format!("{}: {}", op, err)),
            Failure::Paste(err) => err,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Checkout(err) => write!(f, "{}", err),
            Failure::Sqlite(err) => write!(f, "{}", err),
            Failure::Paste(err) => write!(f, "{}", err),
        }
    }
}

impl From<rusqlite::Error> for Failure {
    fn from(err: rusqlite::Error) -> Self {
        Failure::Sqlite(err)
    }
}

/// Pooled SQLite paste store.
pub struct SqlitePasteStore {
    path: PathBuf,
    op_timeout: Duration,
    pool: RwLock<Option<SqlitePool>>,
}

impl SqlitePasteStore {
    /// Open (creating if needed) the database at `config.path`, verify it
    /// answers within `connect_timeout`, and bring the schema up to date.
    ///
    /// # Errors
    ///
    /// - `PasteError::Config` for invalid pool settings or an unknown format
    /// - `PasteError::Connection` if the probe fails or times out
    pub fn connect(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        crate::fs::ensure_parent_dir(&config.path).map_err(|e| {
            PasteError::Connection(format!("Cannot create store directory: {}", e))
        })?;

        let busy_timeout = config.op_timeout;
        let manager = SqliteConnectionManager::file(&config.path).with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            Ok(())
        });
        let pool = Pool::builder()
            .min_idle(Some(config.min_idle))
            .max_size(config.max_size)
            .connection_timeout(config.op_timeout)
            .build_unchecked(manager);

        info!(
            path = %config.path.display(),
            min_idle = config.min_idle,
            max_size = config.max_size,
            "Connecting to paste store"
        );

        let mut conn = pool.get_timeout(config.connect_timeout).map_err(|e| {
            PasteError::Connection(format!("Cannot connect to paste store: {}", e))
        })?;
        let alive: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
        if alive != 1 {
            return Err(PasteError::Connection(
                "Paste store liveness probe failed".to_string(),
            ));
        }
        schema::migrate(&mut conn)?;
        drop(conn);

        info!("Paste store ready");
        Ok(Self {
            path: config.path.clone(),
            op_timeout: config.op_timeout,
            pool: RwLock::new(Some(pool)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn pool(&self) -> Result<SqlitePool> {
        let guard = self
            .pool
            .read()
            .map_err(|_| PasteError::Connection("Store lock poisoned".to_string()))?;
        guard
            .clone()
            .ok_or_else(|| PasteError::Connection("Paste store is closed".to_string()))
    }

    /// Run `op` on a pooled connection, retrying once on transient failure.
    ///
    /// Checkout and lock waits of all attempts share one `op_timeout`
    /// deadline.
    fn run<T, F>(&self, name: &str, op: F) -> Result<T>
    where
        F: Fn(&mut Connection) -> std::result::Result<T, Failure>,
    {
        let pool = self.pool()?;
        let deadline = Instant::now() + self.op_timeout;
        let mut attempt = 1;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let outcome = match pool.get_timeout(remaining) {
                Ok(mut conn) => match conn.busy_timeout(remaining) {
                    Ok(()) => op(&mut *conn),
                    Err(err) => Err(Failure::Sqlite(err)),
                },
                Err(err) => Err(Failure::Checkout(err)),
            };
            match outcome {
                Ok(value) => return Ok(value),
                Err(failure)
                    if attempt < MAX_ATTEMPTS
                        && failure.is_transient()
                        && Instant::now() < deadline =>
                {
                    warn!(op = name, attempt, error = %failure, "Transient store failure, retrying");
                    attempt += 1;
                }
                Err(failure) => return Err(failure.into_error(name)),
            }
        }
    }
}

impl fmt::Debug for SqlitePasteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlitePasteStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// WHERE clause selecting the rows an update applies to, with placeholders
/// numbered from `first`.
fn update_filter(
    short_id: &str,
    update: &PasteUpdate,
    first: usize,
) -> (String, Vec<Box<dyn ToSql>>) {
    let mut clause = format!("short_id = ?{}", first);
    let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(short_id.to_string())];

    if let Some(required) = update.require_wait_verify {
        values.push(Box::new(required));
        clause.push_str(&format!(" AND wait_verify = ?{}", first + values.len() - 1));
    }
    if let Some(live_at) = update.require_live_at {
        values.push(Box::new(live_at.timestamp_millis()));
        clause.push_str(&format!(" AND expire_at > ?{}", first + values.len() - 1));
    }

    (clause, values)
}

impl PasteStore for SqlitePasteStore {
    fn create(&self, record: &PasteRecord) -> Result<()> {
        if record.is_empty_sentinel() {
            return Err(PasteError::Validation(
                "Refusing to store an empty paste".to_string(),
            ));
        }
        if record.short_id.is_empty() {
            return Err(PasteError::Validation("Short id is required".to_string()));
        }

        let row = PasteRow::from(record);
        self.run("create", |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO pastes ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    COLUMNS
                ),
                params![
                    row.short_id,
                    row.payload,
                    row.payload_subtype,
                    row.passwd,
                    row.pwd_is_set,
                    row.user_ip,
                    row.expire_at,
                    row.wait_verify,
                    row.read_then_burn,
                ],
            )?;
            Ok(())
        })?;

        debug!(short_id = %record.short_id, expire_at = %record.expire_at, "Stored paste");
        Ok(())
    }

    fn read(&self, short_id: &str, now: DateTime<Utc>) -> Result<PasteRecord> {
        let now_ms = now.timestamp_millis();
        let row = self.run("read", |conn| {
            let row = conn
                .query_row(
                    &format!(
                        "SELECT {} FROM pastes WHERE short_id = ?1 AND expire_at > ?2",
                        COLUMNS
                    ),
                    params![short_id, now_ms],
                    PasteRow::from_row,
                )
                .optional()?;
            Ok(row)
        })?;

        let record = match row {
            Some(row) => PasteRecord::try_from(row)?,
            None => return Err(PasteError::NotFound),
        };
        if record.is_empty_sentinel() {
            return Err(PasteError::NotFound);
        }
        Ok(record)
    }

    fn update(&self, short_id: &str, update: &PasteUpdate) -> Result<UpdateOutcome> {
        if update.is_empty() {
            return Err(PasteError::Validation("Update sets no fields".to_string()));
        }

        let outcome = self.run("update", |conn| {
            let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

            let (filter, filter_values) = update_filter(short_id, update, 1);
            let matched: i64 = tx.query_row(
                &format!("SELECT COUNT(*) FROM pastes WHERE {}", filter),
                params_from_iter(filter_values.iter()),
                |row| row.get(0),
            )?;
            if matched == 0 {
                return Err(Failure::Paste(PasteError::NotFound));
            }

            let mut values: Vec<Box<dyn ToSql>> = Vec::new();
            let mut assignments = Vec::new();
            let mut changes = Vec::new();
            if let Some(wait_verify) = update.wait_verify {
                values.push(Box::new(wait_verify));
                assignments.push(format!("wait_verify = ?{}", values.len()));
                changes.push(format!("wait_verify IS NOT ?{}", values.len()));
            }
            if let Some(expire_at) = update.expire_at {
                values.push(Box::new(expire_at.timestamp_millis()));
                assignments.push(format!("expire_at = ?{}", values.len()));
                changes.push(format!("expire_at IS NOT ?{}", values.len()));
            }

            let (filter, filter_values) = update_filter(short_id, update, values.len() + 1);
            values.extend(filter_values);

            let modified = tx.execute(
                &format!(
                    "UPDATE pastes SET {} WHERE {} AND ({})",
                    assignments.join(", "),
                    filter,
                    changes.join(" OR ")
                ),
                params_from_iter(values.iter()),
            )?;
            tx.commit()?;

            Ok(UpdateOutcome {
                matched: usize::try_from(matched).unwrap_or(usize::MAX),
                modified,
            })
        })?;

        info!(
            short_id,
            matched = outcome.matched,
            modified = outcome.modified,
            "Updated paste"
        );
        Ok(outcome)
    }

    fn delete(&self, short_id: &str) -> Result<bool> {
        let removed = self.run("delete", |conn| {
            Ok(conn.execute("DELETE FROM pastes WHERE short_id = ?1", [short_id])?)
        })?;
        debug!(short_id, removed, "Deleted paste");
        Ok(removed > 0)
    }

    fn take(&self, short_id: &str, now: DateTime<Utc>) -> Result<PasteRecord> {
        let now_ms = now.timestamp_millis();
        let row = self.run("take", |conn| {
            let row = conn
                .query_row(
                    &format!(
                        "DELETE FROM pastes WHERE short_id = ?1 AND expire_at > ?2 RETURNING {}",
                        COLUMNS
                    ),
                    params![short_id, now_ms],
                    PasteRow::from_row,
                )
                .optional()?;
            Ok(row)
        })?;

        match row {
            Some(row) => {
                debug!(short_id, "Claimed paste for disclosure");
                PasteRecord::try_from(row)
            }
            None => Err(PasteError::NotFound),
        }
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let now_ms = now.timestamp_millis();
        let purged = self.run("purge", |conn| {
            Ok(conn.execute("DELETE FROM pastes WHERE expire_at <= ?1", [now_ms])?)
        })?;
        info!(purged, "Purged expired pastes");
        Ok(purged)
    }

    fn check_integrity(&self) -> Result<()> {
        self.run("check", |conn| schema::check(conn).map_err(Failure::Paste))
    }

    fn close(&self) {
        let pool = match self.pool.write() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if pool.is_some() {
            info!(path = %self.path.display(), "Closed paste store");
        }
    }
}
