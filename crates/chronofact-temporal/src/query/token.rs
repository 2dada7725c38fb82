//! Continuation tokens.
//!
//! A token is URL-safe base64 (no padding) over a small JSON body carrying
//! the last returned position, the scan direction and a fingerprint of the
//! query it belongs to. The fingerprint binds the token to its scope and
//! window, so a token minted for one query is rejected by any other.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::DateTime;
use serde::{Deserialize, Serialize};

use chronofact_core::{ChronoError, QueryScope, TimeWindow, VersionCursor, VersionPosition};

const TOKEN_VERSION: u8 = 1;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("not base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("malformed body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("unsupported token version {0}")]
    Version(u8),

    #[error("position out of range")]
    Position,

    #[error("token was issued for a different query")]
    ScopeMismatch,

    #[error("token was issued for the opposite sort direction")]
    DirectionMismatch,
}

impl From<TokenError> for ChronoError {
    fn from(e: TokenError) -> Self {
        ChronoError::InvalidPaginationToken(e.to_string())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenBody {
    v: u8,
    ts: i64,
    seq: u64,
    asc: bool,
    scope: String,
}

/// Fingerprint of everything a token must agree with except the page size.
pub fn fingerprint(scope: &QueryScope, window: &TimeWindow, ascending: bool) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(scope.label().as_bytes());
    hasher.update(&[0]);
    for bound in [window.start, window.end] {
        match bound {
            Some(ts) => hasher.update(&ts.timestamp_micros().to_le_bytes()),
            None => hasher.update(b"-"),
        };
        hasher.update(&[0]);
    }
    hasher.update(&[ascending as u8]);
    hasher.finalize().to_hex()[..16].to_string()
}

pub fn encode(
    position: &VersionPosition,
    ascending: bool,
    fingerprint: &str,
) -> Result<String, serde_json::Error> {
    let body = TokenBody {
        v: TOKEN_VERSION,
        ts: position.timestamp.timestamp_micros(),
        seq: position.sequence,
        asc: ascending,
        scope: fingerprint.to_string(),
    };
    Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(&body)?))
}

/// Decode `token` and check it belongs to the query described by
/// `fingerprint` and `ascending`.
pub fn decode(token: &str, fingerprint: &str, ascending: bool) -> Result<VersionCursor, TokenError> {
    let bytes = URL_SAFE_NO_PAD.decode(token.trim())?;
    let body: TokenBody = serde_json::from_slice(&bytes)?;
    if body.v != TOKEN_VERSION {
        return Err(TokenError::Version(body.v));
    }
    if body.asc != ascending {
        return Err(TokenError::DirectionMismatch);
    }
    if body.scope != fingerprint {
        return Err(TokenError::ScopeMismatch);
    }
    let timestamp = DateTime::from_timestamp_micros(body.ts).ok_or(TokenError::Position)?;
    Ok(VersionCursor(VersionPosition::new(timestamp, body.seq)))
}
