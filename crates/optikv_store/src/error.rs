//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
///
/// A missing item is not an error: [`Storer::get`](crate::Storer::get)
/// reports it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Optimistic-lock conflict: the stored version no longer matches the
    /// version the caller presented. Recoverable by re-reading the item
    /// and retrying the write.
    #[error("version gone: item '{id}' changed since version {presented} was read")]
    VersionGone {
        /// The id of the contested item.
        id: String,
        /// The version the caller presented.
        presented: i64,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serializing or deserializing an item failed.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// The operation was cancelled through its [`Context`](crate::Context).
    #[error("operation cancelled")]
    Cancelled,

    /// The deadline carried by the [`Context`](crate::Context) passed.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// A store could not be initialized. No partial store is returned.
    #[error("store construction failed: {message}")]
    Construction {
        /// Description of the failure.
        message: String,
    },
}

impl StoreError {
    /// Creates a version conflict error.
    pub fn version_gone(id: impl Into<String>, presented: i64) -> Self {
        Self::VersionGone {
            id: id.into(),
            presented,
        }
    }

    /// Creates a construction failure error.
    pub fn construction(message: impl Into<String>) -> Self {
        Self::Construction {
            message: message.into(),
        }
    }

    /// Returns true if this error is an optimistic-lock conflict.
    ///
    /// Callers typically branch on this to drive a re-read-and-retry loop.
    #[must_use]
    pub fn is_version_gone(&self) -> bool {
        matches!(self, Self::VersionGone { .. })
    }
}
