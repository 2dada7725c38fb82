//! Snapshot engine: as-of reconstruction and snapshot diffs.

pub mod diff;
pub mod reconstruct;

pub use diff::diff;
pub use reconstruct::{reconstruct_at, reduce_latest};
