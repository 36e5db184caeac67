use async_trait::async_trait;
use uuid::Uuid;

use crate::{Document, DocumentQuery, Result, Version};

/// Core trait for document store implementations.
///
/// All implementations must be thread-safe (Send + Sync). Writes are atomic
/// per document; the unique key constraint is enforced by the store itself so
/// callers can rely on it under concurrent writers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a new document at [`Version::first`].
    ///
    /// Fails with `AlreadyExists` if the id is taken and with `UniqueViolation`
    /// if another document of the collection holds the same unique key.
    async fn insert(&self, document: Document) -> Result<Document>;

    /// Replaces a document if its stored version equals `expected`.
    ///
    /// Returns the stored document at `expected.next()`. Fails with
    /// `ConcurrencyConflict` on a version mismatch and `NotFound` if absent.
    async fn update(&self, document: Document, expected: Version) -> Result<Document>;

    /// Loads a document by id.
    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>>;

    /// Loads the document holding `key` in `collection`.
    async fn get_by_unique_key(&self, collection: &str, key: &str) -> Result<Option<Document>>;

    /// Removes a document. Returns false if it did not exist.
    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool>;

    /// Retrieves documents matching a query.
    async fn query(&self, query: DocumentQuery) -> Result<Vec<Document>>;
}

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<T> {
    async fn insert(&self, document: Document) -> Result<Document> {
        (**self).insert(document).await
    }

    async fn update(&self, document: Document, expected: Version) -> Result<Document> {
        (**self).update(document, expected).await
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>> {
        (**self).get(collection, id).await
    }

    async fn get_by_unique_key(&self, collection: &str, key: &str) -> Result<Option<Document>> {
        (**self).get_by_unique_key(collection, key).await
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool> {
        (**self).delete(collection, id).await
    }

    async fn query(&self, query: DocumentQuery) -> Result<Vec<Document>> {
        (**self).query(query).await
    }
}
