//! Error types for ShelfDB core.

use crate::entity::EntityId;
use thiserror::Error;

/// Result type for collection operations.
pub type CollectionResult<T> = Result<T, CollectionError>;

/// Errors that can occur in collection operations.
///
/// Every error is terminal for the operation that raised it; the
/// engine never retries internally and never leaves the in-memory
/// map, view, and metadata mutually inconsistent (metadata is written
/// last, after the entity write has succeeded).
#[derive(Debug, Error)]
pub enum CollectionError {
    /// Key-value store error, including unavailability and quota
    /// rejections.
    #[error("storage error: {0}")]
    Storage(#[from] shelf_storage::StorageError),

    /// JSON encode/decode error.
    #[error("codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// An update referenced an identity that is not in the collection.
    #[error("entity not found: id {id} in collection {collection}")]
    EntityNotFound {
        /// The identity that was not found.
        id: EntityId,
        /// Name of the collection searched.
        collection: String,
    },

    /// A loaded or unserialized payload is not a JSON object.
    #[error("invalid entity shape: {message}")]
    InvalidEntityShape {
        /// Description of the shape violation.
        message: String,
    },

    /// The serialize hook returned something that is not a JSON object.
    #[error("invalid serialization: {message}")]
    InvalidSerialization {
        /// Description of the violation.
        message: String,
    },

    /// Persisted state does not match the metadata record.
    #[error("invalid collection format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },
}

impl CollectionError {
    /// Creates an entity not found error.
    pub fn entity_not_found(id: EntityId, collection: impl Into<String>) -> Self {
        Self::EntityNotFound {
            id,
            collection: collection.into(),
        }
    }

    /// Creates an invalid entity shape error.
    pub fn invalid_entity_shape(message: impl Into<String>) -> Self {
        Self::InvalidEntityShape {
            message: message.into(),
        }
    }

    /// Creates an invalid serialization error.
    pub fn invalid_serialization(message: impl Into<String>) -> Self {
        Self::InvalidSerialization {
            message: message.into(),
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }
}
