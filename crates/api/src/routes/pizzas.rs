//! Catalog endpoints for administrators and customers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::PizzaId;
use domain::PizzaView;
use store::DocumentStore;

use crate::auth::AuthenticatedPrincipal;
use crate::dto::{ApiJson, PizzaPatchRequest, PizzaRequest};
use crate::error::ApiError;
use crate::state::AppState;

use super::parse_id;

/// GET /api/admin/pizzas: public catalog entries only.
#[tracing::instrument(skip_all)]
pub async fn list_public<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<Json<Vec<PizzaView>>, ApiError> {
    let pizzas = state.catalog.list_public(&principal).await?;
    Ok(Json(state.catalog.views(&pizzas).await?))
}

/// POST /api/admin/pizzas
#[tracing::instrument(skip_all)]
pub async fn create_public<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    ApiJson(req): ApiJson<PizzaRequest>,
) -> Result<(StatusCode, Json<PizzaView>), ApiError> {
    let (recipe, price) = req.into_parts();
    let pizza = state.catalog.create_public(&principal, recipe, price).await?;
    Ok((StatusCode::CREATED, Json(state.catalog.view(&pizza).await?)))
}

/// PUT /api/admin/pizzas/{id}
#[tracing::instrument(skip(state, principal, req))]
pub async fn update_public<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<PizzaPatchRequest>,
) -> Result<Json<PizzaView>, ApiError> {
    let id: PizzaId = parse_id(&id, "pizza")?;
    let pizza = state
        .catalog
        .update_public(&principal, id, req.into())
        .await?;
    Ok(Json(state.catalog.view(&pizza).await?))
}

/// DELETE /api/admin/pizzas/{id}
#[tracing::instrument(skip(state, principal))]
pub async fn delete_public<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: PizzaId = parse_id(&id, "pizza")?;
    state.catalog.delete_public(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/customer/pizzas: public pizzas plus the caller's own.
#[tracing::instrument(skip_all)]
pub async fn list_visible<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<Json<Vec<PizzaView>>, ApiError> {
    let pizzas = state.catalog.list_visible(&principal).await?;
    Ok(Json(state.catalog.views(&pizzas).await?))
}

/// POST /api/customer/pizzas: the price is recomputed server-side.
#[tracing::instrument(skip_all)]
pub async fn create_custom<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    ApiJson(req): ApiJson<PizzaRequest>,
) -> Result<(StatusCode, Json<PizzaView>), ApiError> {
    let (recipe, price) = req.into_parts();
    let pizza = state.catalog.create_custom(&principal, recipe, price).await?;
    Ok((StatusCode::CREATED, Json(state.catalog.view(&pizza).await?)))
}
