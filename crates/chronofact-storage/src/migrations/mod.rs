//! Migration runner: version tracking, forward-only, transactional per migration.

mod v001_facts_table;
mod v002_id_index;

use rusqlite::Connection;
use tracing::{debug, info, warn};

use chronofact_core::StorageError;

use crate::to_storage_err;

/// Highest schema version this build knows how to create.
pub const LATEST_VERSION: u32 = 2;

type MigrationFn = fn(&Connection) -> Result<(), StorageError>;

const MIGRATIONS: [(u32, &str, MigrationFn); 2] = [
    (1, "facts_table", v001_facts_table::migrate),
    (2, "id_index", v002_id_index::migrate),
];

/// Current schema version; 0 if the database was never provisioned.
pub fn current_version(conn: &Connection) -> Result<u32, StorageError> {
    let exists: bool = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version'")
        .and_then(|mut stmt| stmt.exists([]))
        .map_err(|e| to_storage_err(e.to_string()))?;

    if !exists {
        return Ok(0);
    }

    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}

/// Apply every migration newer than the recorded version, in order.
/// Returns how many were applied.
pub fn run_migrations(conn: &Connection) -> Result<u32, StorageError> {
    let from = current_version(conn)?;
    let pending: Vec<_> = MIGRATIONS.iter().filter(|(v, _, _)| *v > from).collect();
    if pending.is_empty() {
        debug!("fact store schema is up to date (v{from})");
        return Ok(0);
    }

    info!("upgrading fact store schema from v{from} to v{LATEST_VERSION}");
    for &&(version, name, migrate_fn) in &pending {
        apply(conn, version, name, migrate_fn)?;
    }
    Ok(pending.len() as u32)
}

/// One migration and its ledger row commit together or not at all.
/// Dropping the transaction on an early return rolls it back.
fn apply(
    conn: &Connection,
    version: u32,
    name: &str,
    migrate_fn: MigrationFn,
) -> Result<(), StorageError> {
    let failed = |reason: String| {
        warn!("migration v{version:03} ({name}) failed: {reason}");
        StorageError::MigrationFailed { version, reason }
    };

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| failed(format!("begin: {e}")))?;
    migrate_fn(&tx).map_err(|e| failed(e.to_string()))?;
    tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])
        .map_err(|e| failed(format!("record version: {e}")))?;
    tx.commit().map_err(|e| failed(format!("commit: {e}")))?;

    debug!("applied migration v{version:03}: {name}");
    Ok(())
}
