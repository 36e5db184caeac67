//! HTTP API server for the pizza ordering service.
//!
//! Exposes the ingredient, catalog, cart and order ledger operations over
//! REST, with structured logging (tracing) and Prometheus metrics. The
//! caller's identity arrives in headers set by the upstream auth service.

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use store::DocumentStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: DocumentStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    use routes::{cart, ingredients, orders, pizzas};

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    let admin = Router::new()
        .route("/ingredients", post(ingredients::create::<S>))
        .route("/ingredients/{kind}", get(ingredients::list::<S>))
        .route(
            "/ingredients/{kind}/{id}",
            axum::routing::delete(ingredients::delete::<S>),
        )
        .route(
            "/ingredients/{kind}/{id}/stock",
            put(ingredients::update_stock::<S>),
        )
        .route(
            "/ingredients/{kind}/{id}/price",
            put(ingredients::update_price::<S>),
        )
        .route(
            "/pizzas",
            get(pizzas::list_public::<S>).post(pizzas::create_public::<S>),
        )
        .route(
            "/pizzas/{id}",
            put(pizzas::update_public::<S>).delete(pizzas::delete_public::<S>),
        )
        .route("/orders", get(orders::list_all::<S>))
        .route("/orders/{id}/status", put(orders::advance_status::<S>));

    let customer = Router::new()
        .route(
            "/pizzas",
            get(pizzas::list_visible::<S>).post(pizzas::create_custom::<S>),
        )
        .route("/cart", get(cart::get::<S>))
        .route(
            "/cart/lines",
            post(cart::add_line::<S>).put(cart::set_line_quantity::<S>),
        )
        .route(
            "/cart/lines/{pizza_id}",
            axum::routing::delete(cart::remove_line::<S>),
        )
        .route("/cart/place", post(cart::place::<S>))
        .route("/orders", get(orders::list_mine::<S>))
        .route("/orders/{id}", get(orders::get_mine::<S>));

    Router::new()
        .route("/health", get(routes::health::check))
        .nest("/api/admin", admin)
        .nest("/api/customer", customer)
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
