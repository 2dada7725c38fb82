//! Connection pragmas.

use std::time::Duration;

use rusqlite::Connection;

use chronofact_core::StorageError;

use crate::to_storage_err;

/// Pragmas for the write connection: WAL journal, relaxed sync, busy timeout.
pub fn apply_pragmas(conn: &Connection, busy_timeout_ms: u64) -> Result<(), StorageError> {
    let mode: String = conn
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
        .map_err(|e| to_storage_err(format!("journal_mode: {e}")))?;
    if !mode.eq_ignore_ascii_case("wal") && !mode.eq_ignore_ascii_case("memory") {
        tracing::warn!("journal_mode is {mode}, expected wal");
    }
    conn.pragma_update(None, "synchronous", "NORMAL")
        .map_err(|e| to_storage_err(format!("synchronous: {e}")))?;
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))
        .map_err(|e| to_storage_err(format!("busy_timeout: {e}")))?;
    Ok(())
}

/// Pragmas for pooled read connections. Journal mode is a property of
/// the database file and is left to the writer.
pub fn apply_read_pragmas(conn: &Connection, busy_timeout_ms: u64) -> Result<(), StorageError> {
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))
        .map_err(|e| to_storage_err(format!("busy_timeout: {e}")))?;
    conn.pragma_update(None, "query_only", "ON")
        .map_err(|e| to_storage_err(format!("query_only: {e}")))?;
    Ok(())
}
