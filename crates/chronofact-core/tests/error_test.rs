//! Error taxonomy: every variant maps to a stable code and HTTP status.

use chronofact_core::errors::error_code;
use chronofact_core::{ChronoError, ChronoErrorCode, StorageError};

#[test]
fn each_variant_has_code_and_status() {
    let cases: Vec<(ChronoError, &str, u16)> = vec![
        (
            ChronoError::Validation("empty id".into()),
            error_code::VALIDATION_ERROR,
            400,
        ),
        (ChronoError::not_found("row-1"), error_code::NOT_FOUND, 404),
        (ChronoError::NotInitialized, error_code::NOT_INITIALIZED, 503),
        (
            ChronoError::InvalidPaginationToken("bad base64".into()),
            error_code::INVALID_PAGINATION_TOKEN,
            400,
        ),
        (ChronoError::canceled("query_by_field"), error_code::CANCELED, 499),
        (
            ChronoError::backing("put_fact", StorageError::sqlite("disk I/O error")),
            error_code::BACKING_STORE_ERROR,
            502,
        ),
        (ChronoError::Config("bad".into()), error_code::CONFIG_ERROR, 500),
    ];

    for (err, code, status) in cases {
        assert_eq!(err.error_code(), code, "{err}");
        assert_eq!(err.http_status(), status, "{err}");
    }
}

#[test]
fn backing_store_error_names_the_operation() {
    let err = ChronoError::backing("get_fact", StorageError::ConnectionPoolExhausted { size: 4 });
    let msg = err.to_string();
    assert!(msg.contains("get_fact"), "{msg}");
    assert!(msg.contains("pool exhausted"), "{msg}");
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn storage_error_converts_via_from() {
    fn fails() -> Result<(), ChronoError> {
        Err::<(), _>(StorageError::corrupt("bad row"))?;
        Ok(())
    }
    assert!(matches!(fails(), Err(ChronoError::BackingStore { .. })));
}
