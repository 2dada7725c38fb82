//! Contracts between the fact store and its collaborators.
//!
//! `IBackingStore` is the seam to durable storage (SQLite and in-memory
//! implementations live in `chronofact-storage`). `IFactStore` is the
//! surface the rest of the system consumes.

pub mod backing_store;
pub mod fact_store;

pub use backing_store::IBackingStore;
pub use fact_store::IFactStore;
