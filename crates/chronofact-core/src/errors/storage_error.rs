//! Backing-store errors. Opaque to the fact store; passed through wrapped
//! with the operation that hit them.

/// Errors raised by a backing store adapter.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration v{version:03} failed: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("connection pool exhausted: {size} connections")]
    ConnectionPoolExhausted { size: usize },

    #[error("corrupt item: {message}")]
    Corrupt { message: String },

    #[error("lock poisoned: {0}")]
    Poisoned(String),

    #[error("backing store unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn sqlite(message: impl Into<String>) -> Self {
        Self::SqliteError {
            message: message.into(),
        }
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }
}
