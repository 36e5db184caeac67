//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, OrderError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed principal claim.
    Unauthenticated(String),
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    let status = match &err {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::InvalidTarget(_)
        | DomainError::Validation(_)
        | DomainError::Ingredient(_)
        | DomainError::Catalog(_) => StatusCode::BAD_REQUEST,
        DomainError::Unauthorized { .. } => StatusCode::FORBIDDEN,
        DomainError::Order(order_err) => match order_err {
            OrderError::LineNotFound { .. } => StatusCode::NOT_FOUND,
            OrderError::InvalidTransition { .. } | OrderError::NotModifiable { .. } => {
                StatusCode::CONFLICT
            }
            OrderError::NoOpenOrder
            | OrderError::EmptyCart
            | OrderError::InvalidQuantity { .. }
            | OrderError::PricingMismatch { .. }
            | OrderError::TotalOverflow
            | OrderError::AlreadyCreated => StatusCode::BAD_REQUEST,
        },
        _ if err.is_conflict() => StatusCode::CONFLICT,
        _ => {
            tracing::error!(error = %err, "unhandled domain error");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}
