//! HTTP handlers grouped by resource.

pub mod cart;
pub mod health;
pub mod ingredients;
pub mod metrics;
pub mod orders;
pub mod pizzas;

use crate::error::ApiError;

/// Parses a path segment into a typed identifier.
pub(crate) fn parse_id<T>(raw: &str, what: &str) -> Result<T, ApiError>
where
    T: From<uuid::Uuid>,
{
    uuid::Uuid::parse_str(raw)
        .map(T::from)
        .map_err(|e| ApiError::BadRequest(format!("Invalid {what} id {raw:?}: {e}")))
}
