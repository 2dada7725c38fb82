mod chrono_error;
pub mod error_code;
mod storage_error;

pub use chrono_error::{ChronoError, ChronoResult};
pub use storage_error::StorageError;
