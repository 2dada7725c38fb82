//! Stable machine-readable error codes surfaced to API callers.

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const NOT_INITIALIZED: &str = "NOT_INITIALIZED";
pub const INVALID_PAGINATION_TOKEN: &str = "INVALID_PAGINATION_TOKEN";
pub const CANCELED: &str = "CANCELED";
pub const BACKING_STORE_ERROR: &str = "BACKING_STORE_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";

/// Implemented by every error type that crosses the crate boundary.
pub trait ChronoErrorCode {
    fn error_code(&self) -> &'static str;
}
