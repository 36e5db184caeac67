//! Principal extraction from the trusted auth headers.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::{Principal, PrincipalId, Role};
use store::DocumentStore;

use crate::error::ApiError;
use crate::state::AppState;

pub const PRINCIPAL_ID_HEADER: &str = "x-principal-id";
pub const PRINCIPAL_ROLE_HEADER: &str = "x-principal-role";
pub const PRINCIPAL_NAME_HEADER: &str = "x-principal-name";

/// The principal claim forwarded by the upstream auth service.
///
/// Rejects the request with 401 if the id or role header is missing or
/// malformed. A supplied display name is recorded in the principal directory.
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal(pub Principal);

impl AuthenticatedPrincipal {
    /// Parses the claim headers without touching any state.
    pub fn from_parts(parts: &Parts) -> Result<Principal, ApiError> {
        let id = header(parts, PRINCIPAL_ID_HEADER)?;
        let id = PrincipalId::parse(id).map_err(|e| {
            ApiError::Unauthenticated(format!("invalid {PRINCIPAL_ID_HEADER}: {e}"))
        })?;

        let role: Role = header(parts, PRINCIPAL_ROLE_HEADER)?
            .parse()
            .map_err(|e| ApiError::Unauthenticated(format!("invalid {PRINCIPAL_ROLE_HEADER}: {e}")))?;

        let mut principal = Principal::new(id, role);
        if let Some(name) = parts
            .headers
            .get(PRINCIPAL_NAME_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            principal = principal.with_name(name);
        }
        Ok(principal)
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, ApiError> {
    parts
        .headers
        .get(name)
        .ok_or_else(|| ApiError::Unauthenticated(format!("missing {name} header")))?
        .to_str()
        .map(str::trim)
        .map_err(|_| ApiError::Unauthenticated(format!("invalid {name} header")))
}

impl<S> FromRequestParts<Arc<AppState<S>>> for AuthenticatedPrincipal
where
    S: DocumentStore + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let principal = Self::from_parts(parts)?;
        state.directory.record(&principal).await?;
        Ok(Self(principal))
    }
}
