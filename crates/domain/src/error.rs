//! Domain error types.

use common::Role;
use store::StoreError;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::ingredient::IngredientError;
use crate::order::OrderError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Unknown id (or an id of the wrong kind).
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The operation is guarded against this target (wrong owner or wrong kind).
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// The principal lacks the role the operation requires.
    #[error("Unauthorized: {action} requires the {required} role")]
    Unauthorized { action: &'static str, required: Role },

    /// Malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An ingredient rule was violated.
    #[error(transparent)]
    Ingredient(#[from] IngredientError),

    /// A catalog rule was violated.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A cart or order rule was violated.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// An error occurred in the document store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns true when the failure was a lost optimistic-concurrency race.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            DomainError::Store(StoreError::ConcurrencyConflict { .. })
                | DomainError::Store(StoreError::UniqueViolation { .. })
        )
    }
}
