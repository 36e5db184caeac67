//! Versioned JSON document persistence.
//!
//! Documents live in named collections and are written with optimistic
//! concurrency. A collection-wide unique key lets callers express
//! "at most one document of this shape" constraints that hold under
//! concurrent writers.

pub mod document;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use document::{Document, Version};
pub use error::{Result, StoreError};
pub use memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use query::{DocumentQuery, OwnerFilter, SortOrder};
pub use store::DocumentStore;
