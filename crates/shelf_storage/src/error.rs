//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store cannot be reached at all.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Description of why the store is unreachable.
        message: String,
    },

    /// A write was rejected because it would exceed the store's capacity.
    #[error("storage quota exceeded: limit {limit} bytes, write would need {attempted}")]
    QuotaExceeded {
        /// The configured capacity in bytes.
        limit: usize,
        /// The total size the rejected write would have required.
        attempted: usize,
    },

    /// The key cannot be represented by this store.
    #[error("invalid key: {key:?}")]
    InvalidKey {
        /// The offending key.
        key: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates an invalid key error.
    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey { key: key.into() }
    }
}
