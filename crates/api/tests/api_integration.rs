//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use api::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::PrincipalId;
use domain::{InMemoryNotifier, StatusPolicy};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use store::InMemoryDocumentStore;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

struct TestApp {
    router: axum::Router,
    state: Arc<AppState<InMemoryDocumentStore>>,
    notifier: InMemoryNotifier,
    admin: Caller,
}

#[derive(Clone)]
struct Caller {
    id: PrincipalId,
    role: &'static str,
    name: Option<&'static str>,
}

impl Caller {
    fn admin() -> Self {
        Self {
            id: PrincipalId::new(),
            role: "admin",
            name: Some("Head Chef"),
        }
    }

    fn customer(name: &'static str) -> Self {
        Self {
            id: PrincipalId::new(),
            role: "customer",
            name: Some(name),
        }
    }
}

fn setup() -> TestApp {
    let notifier = InMemoryNotifier::new();
    let alerts = domain::AlertSettings {
        recipients: vec!["chef@example.com".to_string(), "owner@example.com".to_string()],
        ..domain::AlertSettings::default()
    };
    let state = Arc::new(AppState::new(
        InMemoryDocumentStore::new(),
        alerts,
        Arc::new(notifier.clone()),
        StatusPolicy::Sequential,
    ));
    let router = api::create_app(state.clone(), get_metrics_handle());

    TestApp {
        router,
        state,
        notifier,
        admin: Caller::admin(),
    }
}

impl TestApp {
    async fn call(
        &self,
        caller: Option<&Caller>,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(caller) = caller {
            builder = builder
                .header("x-principal-id", caller.id.to_string())
                .header("x-principal-role", caller.role);
            if let Some(name) = caller.name {
                builder = builder.header("x-principal-name", name);
            }
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    async fn create_ingredient(&self, kind: &str, name: &str, price: &str) -> String {
        let (status, json) = self
            .call(
                Some(&self.admin),
                "POST",
                "/api/admin/ingredients",
                Some(json!({ "kind": kind, "name": name, "stock": "50", "price": price })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["id"].as_str().unwrap().to_string()
    }

    async fn create_public_pizza(&self, title: &str, price: &str) -> String {
        let (status, json) = self
            .call(
                Some(&self.admin),
                "POST",
                "/api/admin/pizzas",
                Some(json!({ "title": title, "price": price })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let (status, json) = app.call(None, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_principal_is_401() {
    let app = setup();

    let (status, json) = app.call(None, "GET", "/api/customer/cart", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(json["error"].as_str().unwrap().contains("x-principal-id"));
}

#[tokio::test]
async fn test_customer_cannot_use_admin_routes() {
    let app = setup();
    let customer = Caller::customer("Ada");

    let (status, json) = app
        .call(Some(&customer), "GET", "/api/admin/ingredients/base", None)
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_ingredient_round_trip_and_low_stock_alert() {
    let app = setup();
    let id = app.create_ingredient("veggies", "Olive", "0.75").await;

    let (status, json) = app
        .call(Some(&app.admin), "GET", "/api/admin/ingredients/vegetable", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["id"], id.as_str());
    assert_eq!(json[0]["stock"], 50);
    assert_eq!(json[0]["threshold"], 20);
    assert_eq!(json[0]["unit_price"], "0.75");

    let (status, json) = app
        .call(
            Some(&app.admin),
            "PUT",
            &format!("/api/admin/ingredients/veggies/{id}/stock"),
            Some(json!({ "stock": "5" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stock"], 5);
    assert_eq!(json["below_threshold"], true);

    app.state.ingredients.dispatcher().drain().await;
    let sent = app.notifier.sent().await;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].subject, "Low Stock Alert: Olive");
}

#[tokio::test]
async fn test_unknown_kind_is_404_and_bad_body_is_400() {
    let app = setup();

    let (status, _) = app
        .call(Some(&app.admin), "GET", "/api/admin/ingredients/meat", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = app
        .call(
            Some(&app.admin),
            "POST",
            "/api/admin/ingredients",
            Some(json!({ "kind": "base", "name": "Thin", "stock": 1, "price": "1", "colour": "red" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_custom_pizza_price_is_recomputed() {
    let app = setup();
    let base = app.create_ingredient("base", "Thin", "3.00").await;
    let cheese = app.create_ingredient("cheese", "Mozzarella", "1.25").await;
    let customer = Caller::customer("Ada");

    let (status, json) = app
        .call(
            Some(&customer),
            "POST",
            "/api/customer/pizzas",
            Some(json!({ "title": "Mine", "base": base, "cheese": cheese, "price": "0.01" })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["price"], "4.25");
    assert_eq!(json["base"]["name"], "Thin");
    assert_eq!(json["owner"], customer.id.to_string());
}

#[tokio::test]
async fn test_owned_pizza_cannot_be_edited_through_admin_routes() {
    let app = setup();
    let customer = Caller::customer("Ada");
    let (_, pizza) = app
        .call(
            Some(&customer),
            "POST",
            "/api/customer/pizzas",
            Some(json!({ "title": "Mine" })),
        )
        .await;
    let id = pizza["id"].as_str().unwrap();

    let (status, _) = app
        .call(
            Some(&app.admin),
            "PUT",
            &format!("/api/admin/pizzas/{id}"),
            Some(json!({ "title": "Hijacked" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(Some(&app.admin), "DELETE", &format!("/api/admin/pizzas/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cart_to_delivered_flow() {
    let app = setup();
    let a = app.create_public_pizza("A", "2.00").await;
    let b = app.create_public_pizza("B", "1.50").await;
    let customer = Caller::customer("Ada");

    let (status, cart) = app.call(Some(&customer), "GET", "/api/customer/cart", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(cart.is_null());

    app.call(
        Some(&customer),
        "POST",
        "/api/customer/cart/lines",
        Some(json!({ "pizza_id": a, "quantity": "2" })),
    )
    .await;
    let (status, cart) = app
        .call(
            Some(&customer),
            "POST",
            "/api/customer/cart/lines",
            Some(json!({ "pizza_id": b })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["status"], "Received");
    assert_eq!(cart["lines"].as_array().unwrap().len(), 2);
    assert_eq!(cart["total_price"], "5.50");

    let (status, order) = app
        .call(Some(&customer), "POST", "/api/customer/cart/place", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "InKitchen");
    assert_eq!(order["status_label"], "In the Kitchen");
    assert_eq!(order["total_price"], "5.50");
    assert_eq!(order["lines"][0]["title"], "A");
    let order_id = order["id"].as_str().unwrap().to_string();

    let (status, mine) = app
        .call(Some(&customer), "GET", &format!("/api/customer/orders/{order_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine["id"], order_id.as_str());

    let status_uri = format!("/api/admin/orders/{order_id}/status");
    for (target, expected) in [
        ("Sent to Delivery", "OutForDelivery"),
        ("delivered", "Delivered"),
    ] {
        let (status, json) = app
            .call(
                Some(&app.admin),
                "PUT",
                &status_uri,
                Some(json!({ "status": target })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{json}");
        assert_eq!(json["status"], expected);
    }

    let (status, _) = app
        .call(
            Some(&app.admin),
            "PUT",
            &status_uri,
            Some(json!({ "status": "Delivered" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, all) = app.call(Some(&app.admin), "GET", "/api/admin/orders", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all[0]["principal_name"], "Ada");
}

#[tokio::test]
async fn test_cart_errors() {
    let app = setup();
    let a = app.create_public_pizza("A", "2.00").await;
    let customer = Caller::customer("Ada");

    let (status, json) = app
        .call(Some(&customer), "POST", "/api/customer/cart/place", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Cart is empty");

    let (status, _) = app
        .call(
            Some(&customer),
            "PUT",
            "/api/customer/cart/lines",
            Some(json!({ "pizza_id": a, "quantity": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.call(
        Some(&customer),
        "POST",
        "/api/customer/cart/lines",
        Some(json!({ "pizza_id": a, "quantity": 1 })),
    )
    .await;
    let (status, _) = app
        .call(
            Some(&customer),
            "PUT",
            "/api/customer/cart/lines",
            Some(json!({ "pizza_id": PrincipalId::new().to_string(), "quantity": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call(
            Some(&customer),
            "POST",
            "/api/customer/cart/lines",
            Some(json!({ "pizza_id": a, "quantity": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(Some(&customer), "GET", "/api/customer/orders/not-a-uuid", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let other = Caller::customer("Grace");
    let (_, cart) = app.call(Some(&customer), "GET", "/api/customer/cart", None).await;
    let cart_id = cart["id"].as_str().unwrap();
    let (status, _) = app
        .call(Some(&other), "GET", &format!("/api/customer/orders/{cart_id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_overflowing_line_total_is_400() {
    let app = setup();
    let gold = app.create_public_pizza("Gold Leaf", "92233720368547758.07").await;
    let customer = Caller::customer("Ada");

    let (status, json) = app
        .call(
            Some(&customer),
            "POST",
            "/api/customer/cart/lines",
            Some(json!({ "pizza_id": gold, "quantity": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Order total is too large");

    let (status, cart) = app
        .call(
            Some(&customer),
            "POST",
            "/api/customer/cart/lines",
            Some(json!({ "pizza_id": gold, "quantity": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["total_price"], "92233720368547758.07");

    let (status, order) = app
        .call(Some(&customer), "POST", "/api/customer/cart/place", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["total_price"], "92233720368547758.07");
}
