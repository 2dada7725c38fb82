//! Cooperative cancellation for store operations.
//!
//! A token is a shared flag plus an optional deadline. Clones observe the
//! same flag, so a caller can hand one clone to the store and cancel from
//! another task. Operations check the token before every backing-store
//! call, never in the middle of one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::errors::{ChronoError, ChronoResult};

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that is never cancelled unless `cancel` is called.
    pub fn none() -> Self {
        Self::default()
    }

    /// A token that expires once `deadline` has passed.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        if self.cancelled.load(Ordering::Acquire) {
            return true;
        }
        matches!(self.deadline, Some(d) if Instant::now() >= d)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail with `ChronoError::Canceled` naming `operation` if cancelled.
    pub fn check(&self, operation: &str) -> ChronoResult<()> {
        if self.is_cancelled() {
            Err(ChronoError::canceled(operation))
        } else {
            Ok(())
        }
    }
}
