use super::error_code::{self, ChronoErrorCode};
use super::StorageError;

/// Top-level error type for the fact store.
/// Adapter failures convert into this via `From` or, preferably,
/// [`ChronoError::backing`] so the failing operation is named.
#[derive(Debug, thiserror::Error)]
pub enum ChronoError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("fact not found: {id}")]
    NotFound { id: String },

    #[error("backing store not initialized")]
    NotInitialized,

    #[error("invalid pagination token: {0}")]
    InvalidPaginationToken(String),

    #[error("operation canceled: {operation}")]
    Canceled { operation: String },

    #[error("backing store error during {operation}: {source}")]
    BackingStore {
        operation: String,
        #[source]
        source: StorageError,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ChronoError {
    /// Wrap an adapter failure with the name of the operation that hit it.
    pub fn backing(operation: &str, source: StorageError) -> Self {
        Self::BackingStore {
            operation: operation.to_string(),
            source,
        }
    }

    pub fn canceled(operation: &str) -> Self {
        Self::Canceled {
            operation: operation.to_string(),
        }
    }

    pub fn not_found(id: &str) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    /// HTTP status the API layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::InvalidPaginationToken(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Canceled { .. } => 499,
            Self::BackingStore { .. } => 502,
            Self::NotInitialized => 503,
            Self::Config(_) | Self::Serialization(_) => 500,
        }
    }
}

impl From<StorageError> for ChronoError {
    fn from(source: StorageError) -> Self {
        Self::backing("storage", source)
    }
}

impl ChronoErrorCode for ChronoError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => error_code::VALIDATION_ERROR,
            Self::NotFound { .. } => error_code::NOT_FOUND,
            Self::NotInitialized => error_code::NOT_INITIALIZED,
            Self::InvalidPaginationToken(_) => error_code::INVALID_PAGINATION_TOKEN,
            Self::Canceled { .. } => error_code::CANCELED,
            Self::BackingStore { .. } => error_code::BACKING_STORE_ERROR,
            Self::Config(_) => error_code::CONFIG_ERROR,
            Self::Serialization(_) => error_code::SERIALIZATION_ERROR,
        }
    }
}

/// Convenience type alias.
pub type ChronoResult<T> = Result<T, ChronoError>;
