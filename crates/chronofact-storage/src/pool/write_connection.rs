use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use chronofact_core::StorageError;

use super::pragmas;
use crate::to_storage_err;

/// The single write connection. All writes are serialized through it.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    /// Open (creating if needed) the database file for writing.
    pub fn open(path: &Path, busy_timeout_ms: u64) -> Result<Self, StorageError> {
        let conn = Connection::open(path)
            .map_err(|e| to_storage_err(format!("open {}: {e}", path.display())))?;
        pragmas::apply_pragmas(&conn, busy_timeout_ms)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` with exclusive access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|e| StorageError::Poisoned(format!("write connection: {e}")))?;
        f(&guard)
    }
}
