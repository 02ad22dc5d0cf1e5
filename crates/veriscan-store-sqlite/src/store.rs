// crates/veriscan-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Scan Store
// Description: Durable store for scans, feedback, and emitted-alert keys.
// Purpose: Persist the fraud monitor's inputs and dedup state in SQLite WAL.
// Dependencies: veriscan-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements [`ScanHistoryStore`], [`FeedbackStore`], and
//! [`AlertLedger`] over one `SQLite` database. Writes are append-only or
//! idempotent inserts; reads decode fail-closed, surfacing corruption
//! instead of guessing. The schema is versioned via `user_version` and a
//! mismatch refuses to open rather than migrating silently.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::PoisonError;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;
use veriscan_core::AlertKey;
use veriscan_core::AlertLedger;
use veriscan_core::FeedbackStore;
use veriscan_core::GeoPoint;
use veriscan_core::ProductId;
use veriscan_core::ScanHistoryStore;
use veriscan_core::ScanId;
use veriscan_core::ScanRecord;
use veriscan_core::SerialNumber;
use veriscan_core::StoreError;
use veriscan_core::TamperFeedback;
use veriscan_core::TamperingStatus;
use veriscan_core::Timestamp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` scan store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while opening the store.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Database could not be opened.
    #[error("sqlite open error: {0}")]
    Open(String),
    /// Schema version does not match this build.
    #[error("sqlite schema version mismatch (expected {expected}, got {actual})")]
    SchemaVersion {
        /// Version this build requires.
        expected: i64,
        /// Version found in the database.
        actual: i64,
    },
    /// Schema initialization failed.
    #[error("sqlite schema error: {0}")]
    Schema(String),
}

/// Maps a `rusqlite` error to the interface store error.
fn store_error(error: &rusqlite::Error) -> StoreError {
    StoreError::Io(error.to_string())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Durable scan, feedback, and alert-key store over one `SQLite` database.
///
/// # Invariants
/// - All tables live in one database so a single backup captures consistent
///   monitor state.
/// - Row decoding is fail-closed: undecodable rows surface
///   [`StoreError::Corrupt`].
pub struct SqliteScanStore {
    /// Serialized connection; `SQLite` handles its own file locking.
    connection: Mutex<Connection>,
}

impl SqliteScanStore {
    /// Opens (or creates) the store at the configured path.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// its schema version does not match.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let mut connection = Connection::open_with_flags(&config.path, flags)
            .map_err(|err| SqliteStoreError::Open(err.to_string()))?;
        apply_pragmas(&connection, config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Opens an in-memory store, used by tests and ephemeral hosts.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when initialization fails.
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let mut connection =
            Connection::open_in_memory().map_err(|err| SqliteStoreError::Open(err.to_string()))?;
        let config = SqliteStoreConfig {
            path: Path::new(":memory:").to_path_buf(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::Delete,
            sync_mode: SqliteSyncMode::Normal,
        };
        apply_pragmas(&connection, &config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Runs a closure against the connection.
    fn with_connection<T>(
        &self,
        run: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let connection = self.connection.lock().unwrap_or_else(PoisonError::into_inner);
        run(&connection)
    }
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Open(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Open(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Open(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Schema(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Schema(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Schema(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Schema(err.to_string()))?;
            tx.execute_batch(SCHEMA_SQL)
                .map_err(|err| SqliteStoreError::Schema(err.to_string()))?;
        }
        Some(actual) if actual == SCHEMA_VERSION => {}
        Some(actual) => {
            return Err(SqliteStoreError::SchemaVersion {
                expected: SCHEMA_VERSION,
                actual,
            });
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Schema(err.to_string()))?;
    Ok(())
}

/// Schema for scans, feedback, and the alert ledger.
const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS scans (
    scan_id     TEXT NOT NULL,
    serial      TEXT NOT NULL,
    lat_deg     REAL NOT NULL,
    lon_deg     REAL NOT NULL,
    recorded_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_scans_serial_time ON scans (serial, recorded_at);
CREATE TABLE IF NOT EXISTS feedback (
    scan_id         TEXT NOT NULL,
    product_id      TEXT NOT NULL,
    reported_status TEXT NOT NULL,
    note            TEXT,
    submitted_at    INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS alert_ledger (
    serial     TEXT NOT NULL,
    earlier    TEXT NOT NULL,
    later      TEXT NOT NULL,
    window_end INTEGER NOT NULL,
    PRIMARY KEY (serial, earlier, later)
);
";

// ============================================================================
// SECTION: Row Decoding
// ============================================================================

/// Decodes one scan row, failing closed on invalid stored data.
fn decode_scan(
    scan_id: &str,
    serial: &str,
    lat_deg: f64,
    lon_deg: f64,
    recorded_at: i64,
) -> Result<ScanRecord, StoreError> {
    let scan_id =
        ScanId::parse(scan_id).map_err(|err| StoreError::Corrupt(err.to_string()))?;
    let serial =
        SerialNumber::parse(serial).map_err(|err| StoreError::Corrupt(err.to_string()))?;
    let location =
        GeoPoint::new(lat_deg, lon_deg).map_err(|err| StoreError::Corrupt(err.to_string()))?;
    Ok(ScanRecord {
        scan_id,
        serial,
        location,
        recorded_at: Timestamp::from_unix_millis(recorded_at),
    })
}

/// Stable storage name for a tampering status.
const fn status_name(status: TamperingStatus) -> &'static str {
    match status {
        TamperingStatus::Intact => "intact",
        TamperingStatus::Possible => "possible",
        TamperingStatus::Tampered => "tampered",
    }
}

// ============================================================================
// SECTION: Trait Implementations
// ============================================================================

impl ScanHistoryStore for SqliteScanStore {
    fn record(&self, scan: &ScanRecord) -> Result<(), StoreError> {
        self.with_connection(|connection| {
            connection
                .execute(
                    "INSERT INTO scans (scan_id, serial, lat_deg, lon_deg, recorded_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        scan.scan_id.as_str(),
                        scan.serial.as_str(),
                        scan.location.lat_deg(),
                        scan.location.lon_deg(),
                        scan.recorded_at.as_unix_millis(),
                    ],
                )
                .map_err(|err| store_error(&err))?;
            Ok(())
        })
    }

    fn scans_within(
        &self,
        serial: &SerialNumber,
        window_end: Timestamp,
        window_millis: i64,
    ) -> Result<Vec<ScanRecord>, StoreError> {
        let window_start = window_end.saturating_sub_millis(window_millis);
        self.with_connection(|connection| {
            let mut statement = connection
                .prepare(
                    "SELECT scan_id, serial, lat_deg, lon_deg, recorded_at
                     FROM scans
                     WHERE serial = ?1 AND recorded_at >= ?2 AND recorded_at <= ?3
                     ORDER BY recorded_at ASC",
                )
                .map_err(|err| store_error(&err))?;
            let rows = statement
                .query_map(
                    params![
                        serial.as_str(),
                        window_start.as_unix_millis(),
                        window_end.as_unix_millis(),
                    ],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, f64>(2)?,
                            row.get::<_, f64>(3)?,
                            row.get::<_, i64>(4)?,
                        ))
                    },
                )
                .map_err(|err| store_error(&err))?;

            let mut scans = Vec::new();
            for row in rows {
                let (scan_id, serial, lat_deg, lon_deg, recorded_at) =
                    row.map_err(|err| store_error(&err))?;
                scans.push(decode_scan(&scan_id, &serial, lat_deg, lon_deg, recorded_at)?);
            }
            Ok(scans)
        })
    }
}

impl FeedbackStore for SqliteScanStore {
    fn append(&self, feedback: &TamperFeedback) -> Result<(), StoreError> {
        self.with_connection(|connection| {
            connection
                .execute(
                    "INSERT INTO feedback
                     (scan_id, product_id, reported_status, note, submitted_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        feedback.scan_id.as_str(),
                        feedback.product_id.as_str(),
                        status_name(feedback.reported_status),
                        feedback.note.as_deref(),
                        feedback.submitted_at.as_unix_millis(),
                    ],
                )
                .map_err(|err| store_error(&err))?;
            Ok(())
        })
    }
}

impl AlertLedger for SqliteScanStore {
    fn mark_if_new(&self, key: &AlertKey, window_end: Timestamp) -> Result<bool, StoreError> {
        self.with_connection(|connection| {
            let inserted = connection
                .execute(
                    "INSERT OR IGNORE INTO alert_ledger (serial, earlier, later, window_end)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        key.serial.as_str(),
                        key.earlier.as_str(),
                        key.later.as_str(),
                        window_end.as_unix_millis(),
                    ],
                )
                .map_err(|err| store_error(&err))?;
            Ok(inserted > 0)
        })
    }

    fn prune_before(&self, cutoff: Timestamp) -> Result<(), StoreError> {
        self.with_connection(|connection| {
            connection
                .execute(
                    "DELETE FROM alert_ledger WHERE window_end < ?1",
                    params![cutoff.as_unix_millis()],
                )
                .map_err(|err| store_error(&err))?;
            Ok(())
        })
    }
}

// ============================================================================
// SECTION: Maintenance Queries
// ============================================================================

impl SqliteScanStore {
    /// Returns the number of feedback records for a product.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    pub fn feedback_count(&self, product_id: &ProductId) -> Result<u64, StoreError> {
        self.with_connection(|connection| {
            let count: Option<i64> = connection
                .query_row(
                    "SELECT COUNT(*) FROM feedback WHERE product_id = ?1",
                    params![product_id.as_str()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|err| store_error(&err))?;
            Ok(u64::try_from(count.unwrap_or(0)).unwrap_or(0))
        })
    }

    /// Removes scans recorded before `cutoff`, returning the removed count.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete fails.
    pub fn prune_scans_before(&self, cutoff: Timestamp) -> Result<usize, StoreError> {
        self.with_connection(|connection| {
            connection
                .execute(
                    "DELETE FROM scans WHERE recorded_at < ?1",
                    params![cutoff.as_unix_millis()],
                )
                .map_err(|err| store_error(&err))
        })
    }
}
