use thiserror::Error;
use uuid::Uuid;

use crate::Version;

/// Errors that can occur when interacting with the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The expected version did not match the stored version.
    #[error(
        "Concurrency conflict for {collection}/{id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        collection: String,
        id: Uuid,
        expected: Version,
        actual: Version,
    },

    /// The document does not exist.
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: Uuid },

    /// A document with the same id already exists.
    #[error("Document already exists: {collection}/{id}")]
    AlreadyExists { collection: String, id: Uuid },

    /// Another document in the collection already holds this unique key.
    #[error("Unique key '{key}' already taken in {collection}")]
    UniqueViolation { collection: String, key: String },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for document store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
