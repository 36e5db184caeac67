//! Order history for customers and the ledger for administrators.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::OrderId;
use domain::{OrderStatus, OrderView};
use store::DocumentStore;

use crate::auth::AuthenticatedPrincipal;
use crate::dto::{AdvanceStatusRequest, ApiJson};
use crate::error::ApiError;
use crate::state::AppState;

use super::parse_id;

/// GET /api/customer/orders: the caller's orders, newest first.
#[tracing::instrument(skip_all)]
pub async fn list_mine<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<Json<Vec<OrderView>>, ApiError> {
    let orders = state.cart.list_for_principal(&principal).await?;
    Ok(Json(state.cart.views(&orders).await?))
}

/// GET /api/customer/orders/{id}
#[tracing::instrument(skip(state, principal))]
pub async fn get_mine<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<String>,
) -> Result<Json<OrderView>, ApiError> {
    let id: OrderId = parse_id(&id, "order")?;
    let order = state.cart.get_by_id(&principal, id).await?;
    Ok(Json(state.cart.view(&order).await?))
}

/// GET /api/admin/orders: every order with its principal's name.
#[tracing::instrument(skip_all)]
pub async fn list_all<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<Json<Vec<OrderView>>, ApiError> {
    Ok(Json(state.ledger.list_all(&principal).await?))
}

/// PUT /api/admin/orders/{id}/status
#[tracing::instrument(skip(state, principal, req))]
pub async fn advance_status<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<AdvanceStatusRequest>,
) -> Result<Json<OrderView>, ApiError> {
    let id: OrderId = parse_id(&id, "order")?;
    let target: OrderStatus = req
        .status
        .parse()
        .map_err(|e: domain::order::UnknownStatus| ApiError::BadRequest(e.to_string()))?;

    let order = state.ledger.advance_status(&principal, id, target).await?;
    Ok(Json(state.cart.view(&order).await?))
}
