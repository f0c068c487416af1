//! Error handling types for the synced-line engine.
//!
//! Propagation is best-effort with per-document isolation, so most errors
//! here are logged at the failure site rather than surfaced to a caller.

use std::sync::{MutexGuard, PoisonError};
use thiserror::Error;

/// Comprehensive error type for synced-line operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// A line was treated as a synced line but carries no trailing
    /// `^<digits>` marker
    #[error("no block id marker at end of line: {line:?}")]
    MalformedSyncedLine { line: String },

    /// A vault URL that does not resolve to a readable document
    #[error("document not found: {uri}")]
    DocumentNotFound { uri: String },

    /// Configuration error
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for synced-line operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Helper trait to recover a usable guard from a poisoned mutex.
pub trait LockResultExt<'a, T> {
    /// Recover from a PoisonError with logging.
    ///
    /// The context parameter identifies which operation triggered lock
    /// recovery, helping developers debug thread safety issues.
    fn recover_poison(self, context: &str) -> MutexGuard<'a, T>;
}

impl<'a, T> LockResultExt<'a, T> for Result<MutexGuard<'a, T>, PoisonError<MutexGuard<'a, T>>> {
    fn recover_poison(self, context: &str) -> MutexGuard<'a, T> {
        match self {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!(
                    target: "kagami::lock_recovery",
                    "Recovered from poisoned lock in {}",
                    context
                );
                poisoned.into_inner()
            }
        }
    }
}

/// Helper functions for common error patterns
impl SyncError {
    /// Create a malformed synced line error
    pub fn malformed_synced_line(line: impl Into<String>) -> Self {
        SyncError::MalformedSyncedLine { line: line.into() }
    }

    /// Create a document not found error
    pub fn document_not_found(uri: impl ToString) -> Self {
        SyncError::DocumentNotFound {
            uri: uri.to_string(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        SyncError::Config {
            message: message.into(),
        }
    }
}
