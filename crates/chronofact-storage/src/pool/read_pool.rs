use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags};

use chronofact_core::StorageError;

use super::pragmas;
use crate::to_storage_err;

/// Round-robin pool of read-only connections.
pub struct ReadPool {
    conns: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl ReadPool {
    /// Open `size` read-only connections to an existing database file.
    pub fn open(path: &Path, size: usize, busy_timeout_ms: u64) -> Result<Self, StorageError> {
        if size == 0 {
            return Err(StorageError::ConnectionPoolExhausted { size });
        }
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_NO_MUTEX
            | OpenFlags::SQLITE_OPEN_URI;
        let mut conns = Vec::with_capacity(size);
        for _ in 0..size {
            let conn = Connection::open_with_flags(path, flags)
                .map_err(|e| to_storage_err(format!("open reader {}: {e}", path.display())))?;
            pragmas::apply_read_pragmas(&conn, busy_timeout_ms)?;
            conns.push(Mutex::new(conn));
        }
        Ok(Self {
            conns,
            next: AtomicUsize::new(0),
        })
    }

    pub fn size(&self) -> usize {
        self.conns.len()
    }

    /// Run `f` on a pooled connection. Prefers an idle connection; waits on
    /// the round-robin pick when every connection is busy.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let start = self.next.fetch_add(1, Ordering::Relaxed) % self.conns.len();
        for offset in 0..self.conns.len() {
            let idx = (start + offset) % self.conns.len();
            if let Ok(guard) = self.conns[idx].try_lock() {
                return f(&guard);
            }
        }
        let guard = self.conns[start]
            .lock()
            .map_err(|e| StorageError::Poisoned(format!("read connection {start}: {e}")))?;
        f(&guard)
    }
}
