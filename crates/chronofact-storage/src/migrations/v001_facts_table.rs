//! v001: version ledger plus the append-only facts table with its
//! partition/time indexes.

use rusqlite::Connection;

use chronofact_core::StorageError;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE TABLE IF NOT EXISTS facts (
            seq        INTEGER PRIMARY KEY AUTOINCREMENT,
            id         TEXT NOT NULL,
            namespace  TEXT NOT NULL,
            field_name TEXT NOT NULL,
            ts_micros  INTEGER NOT NULL,
            data_type  TEXT NOT NULL,
            value      TEXT,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            columns    TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_facts_field_time
            ON facts(namespace, field_name, ts_micros, seq);
        CREATE INDEX IF NOT EXISTS idx_facts_namespace_time
            ON facts(namespace, ts_micros, seq);
        CREATE INDEX IF NOT EXISTS idx_facts_time
            ON facts(ts_micros, seq);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
