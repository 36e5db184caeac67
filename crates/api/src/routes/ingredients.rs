//! Administrator ingredient endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::IngredientId;
use domain::IngredientKind;
use store::DocumentStore;

use crate::auth::AuthenticatedPrincipal;
use crate::dto::{
    ApiJson, CreateIngredientRequest, IngredientResponse, UpdatePriceRequest, UpdateStockRequest,
};
use crate::error::ApiError;
use crate::state::AppState;

use super::parse_id;

fn parse_kind(raw: &str) -> Result<IngredientKind, ApiError> {
    raw.parse().map_err(|e: domain::ingredient::UnknownKind| ApiError::NotFound(e.to_string()))
}

/// POST /api/admin/ingredients
#[tracing::instrument(skip_all)]
pub async fn create<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    ApiJson(req): ApiJson<CreateIngredientRequest>,
) -> Result<(StatusCode, Json<IngredientResponse>), ApiError> {
    let ingredient = state.ingredients.create(&principal, req.into_input()).await?;
    Ok((StatusCode::CREATED, Json(IngredientResponse::from(&ingredient))))
}

/// GET /api/admin/ingredients/{kind}
#[tracing::instrument(skip(state, principal))]
pub async fn list<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(kind): Path<String>,
) -> Result<Json<Vec<IngredientResponse>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let ingredients = state.ingredients.list(&principal, kind).await?;
    Ok(Json(ingredients.iter().map(IngredientResponse::from).collect()))
}

/// PUT /api/admin/ingredients/{kind}/{id}/stock
#[tracing::instrument(skip(state, principal, req))]
pub async fn update_stock<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path((kind, id)): Path<(String, String)>,
    ApiJson(req): ApiJson<UpdateStockRequest>,
) -> Result<Json<IngredientResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let id: IngredientId = parse_id(&id, "ingredient")?;
    let ingredient = state
        .ingredients
        .update_stock(&principal, kind, id, req.stock)
        .await?;
    Ok(Json(IngredientResponse::from(&ingredient)))
}

/// PUT /api/admin/ingredients/{kind}/{id}/price
#[tracing::instrument(skip(state, principal, req))]
pub async fn update_price<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path((kind, id)): Path<(String, String)>,
    ApiJson(req): ApiJson<UpdatePriceRequest>,
) -> Result<Json<IngredientResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let id: IngredientId = parse_id(&id, "ingredient")?;
    let ingredient = state
        .ingredients
        .update_price(&principal, kind, id, req.price)
        .await?;
    Ok(Json(IngredientResponse::from(&ingredient)))
}

/// DELETE /api/admin/ingredients/{kind}/{id}
#[tracing::instrument(skip(state, principal))]
pub async fn delete<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path((kind, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let kind = parse_kind(&kind)?;
    let id: IngredientId = parse_id(&id, "ingredient")?;
    state.ingredients.delete(&principal, kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
