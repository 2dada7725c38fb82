//! v002: point lookups of the latest version by fact id.

use rusqlite::Connection;

use chronofact_core::StorageError;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_facts_id_time ON facts(id, ts_micros, seq);",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
