//! Customer cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::PizzaId;
use domain::OrderView;
use store::DocumentStore;

use crate::auth::AuthenticatedPrincipal;
use crate::dto::{AddLineRequest, ApiJson, SetQuantityRequest};
use crate::error::ApiError;
use crate::state::AppState;

use super::parse_id;

/// GET /api/customer/cart: the open cart, or `null` when there is none.
#[tracing::instrument(skip_all)]
pub async fn get<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<Json<Option<OrderView>>, ApiError> {
    let view = match state.cart.open_cart(&principal).await? {
        Some(cart) => Some(state.cart.view(&cart).await?),
        None => None,
    };
    Ok(Json(view))
}

/// POST /api/customer/cart/lines
#[tracing::instrument(skip_all)]
pub async fn add_line<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    ApiJson(req): ApiJson<AddLineRequest>,
) -> Result<Json<OrderView>, ApiError> {
    let cart = state
        .cart
        .add_line(&principal, req.pizza_id, req.quantity)
        .await?;
    Ok(Json(state.cart.view(&cart).await?))
}

/// PUT /api/customer/cart/lines
#[tracing::instrument(skip_all)]
pub async fn set_line_quantity<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    ApiJson(req): ApiJson<SetQuantityRequest>,
) -> Result<Json<OrderView>, ApiError> {
    let cart = state
        .cart
        .set_line_quantity(&principal, req.pizza_id, req.quantity)
        .await?;
    Ok(Json(state.cart.view(&cart).await?))
}

/// DELETE /api/customer/cart/lines/{pizza_id}
#[tracing::instrument(skip(state, principal))]
pub async fn remove_line<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(pizza_id): Path<String>,
) -> Result<Json<OrderView>, ApiError> {
    let pizza_id: PizzaId = parse_id(&pizza_id, "pizza")?;
    let cart = state.cart.remove_line(&principal, pizza_id).await?;
    Ok(Json(state.cart.view(&cart).await?))
}

/// POST /api/customer/cart/place
#[tracing::instrument(skip_all)]
pub async fn place<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<Json<OrderView>, ApiError> {
    let order = state.cart.place(&principal).await?;
    Ok(Json(state.cart.view(&order).await?))
}
