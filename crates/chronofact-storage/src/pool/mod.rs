//! Connection management: one serialized writer, a pool of readers.
//!
//! SQLite in WAL mode allows concurrent readers alongside a single writer.
//! Writes go through `WriteConnection` (mutex-serialized); reads borrow a
//! connection from `ReadPool`.

pub mod pragmas;
mod read_pool;
mod write_connection;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;
