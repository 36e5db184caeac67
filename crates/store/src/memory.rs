use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    Document, DocumentQuery, Result, StoreError, Version,
    query::SortOrder,
    store::DocumentStore,
};

/// In-memory document store.
///
/// Provides the same guarantees as the PostgreSQL implementation: version
/// checks and the unique key constraint are evaluated under a single write lock.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    documents: Arc<RwLock<Vec<Document>>>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of documents stored.
    pub async fn document_count(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Removes every document.
    pub async fn clear(&self) {
        self.documents.write().await.clear();
    }
}

fn key_taken(documents: &[Document], candidate: &Document) -> bool {
    let Some(key) = candidate.unique_key.as_deref() else {
        return false;
    };
    documents.iter().any(|d| {
        d.collection == candidate.collection
            && d.id != candidate.id
            && d.unique_key.as_deref() == Some(key)
    })
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, mut document: Document) -> Result<Document> {
        let mut store = self.documents.write().await;

        if store
            .iter()
            .any(|d| d.collection == document.collection && d.id == document.id)
        {
            return Err(StoreError::AlreadyExists {
                collection: document.collection,
                id: document.id,
            });
        }

        if key_taken(&store, &document) {
            return Err(StoreError::UniqueViolation {
                key: document.unique_key.unwrap_or_default(),
                collection: document.collection,
            });
        }

        document.version = Version::first();
        store.push(document.clone());
        Ok(document)
    }

    async fn update(&self, mut document: Document, expected: Version) -> Result<Document> {
        let mut store = self.documents.write().await;

        let position = store
            .iter()
            .position(|d| d.collection == document.collection && d.id == document.id)
            .ok_or_else(|| StoreError::NotFound {
                collection: document.collection.clone(),
                id: document.id,
            })?;

        let actual = store[position].version;
        if actual != expected {
            return Err(StoreError::ConcurrencyConflict {
                collection: document.collection,
                id: document.id,
                expected,
                actual,
            });
        }

        if key_taken(&store, &document) {
            return Err(StoreError::UniqueViolation {
                key: document.unique_key.unwrap_or_default(),
                collection: document.collection,
            });
        }

        document.version = expected.next();
        document.created_at = store[position].created_at;
        document.updated_at = Utc::now();
        store[position] = document.clone();
        Ok(document)
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>> {
        let store = self.documents.read().await;
        Ok(store
            .iter()
            .find(|d| d.collection == collection && d.id == id)
            .cloned())
    }

    async fn get_by_unique_key(&self, collection: &str, key: &str) -> Result<Option<Document>> {
        let store = self.documents.read().await;
        Ok(store
            .iter()
            .find(|d| d.collection == collection && d.unique_key.as_deref() == Some(key))
            .cloned())
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool> {
        let mut store = self.documents.write().await;
        let before = store.len();
        store.retain(|d| !(d.collection == collection && d.id == id));
        Ok(store.len() != before)
    }

    async fn query(&self, query: DocumentQuery) -> Result<Vec<Document>> {
        let store = self.documents.read().await;

        // Insertion index breaks ties between equal timestamps.
        let mut matches: Vec<(usize, &Document)> = store
            .iter()
            .enumerate()
            .filter(|(_, d)| d.collection == query.collection)
            .filter(|(_, d)| query.owner.matches(d.owner))
            .filter(|(_, d)| match &query.status {
                Some(status) => d.status.as_deref() == Some(status.as_str()),
                None => true,
            })
            .collect();

        matches.sort_by_key(|(idx, d)| (d.created_at, *idx));
        if query.order == SortOrder::NewestFirst {
            matches.reverse();
        }

        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX);

        Ok(matches
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, d)| d.clone())
            .collect())
    }
}
