//! Integration tests for the ingredient, catalog, cart and ledger services.
//!
//! These tests wire the services together over one in-memory document store
//! the way the HTTP layer does.

use std::sync::Arc;

use common::{PizzaId, Principal, PrincipalId};
use domain::{
    AlertDispatcher, AlertSettings, CartService, Catalog, DomainError, InMemoryNotifier,
    IngredientKind, IngredientRef, IngredientStore, Money, NewIngredient, OrderError, OrderLedger,
    OrderStatus, PizzaPatch, PizzaRecipe, PrincipalDirectory, StatusPolicy,
};
use store::InMemoryDocumentStore;

struct Harness {
    store: InMemoryDocumentStore,
    notifier: InMemoryNotifier,
    ingredients: Arc<IngredientStore<InMemoryDocumentStore>>,
    catalog: Arc<Catalog<InMemoryDocumentStore>>,
    cart: Arc<CartService<InMemoryDocumentStore>>,
    ledger: OrderLedger<InMemoryDocumentStore>,
    admin: Principal,
}

/// Helper to wire the services with two alert recipients
fn harness() -> Harness {
    let store = InMemoryDocumentStore::new();
    let notifier = InMemoryNotifier::new();
    let alerts = AlertSettings {
        recipients: AlertSettings::parse_recipients("chef@example.com, owner@example.com"),
        ..AlertSettings::default()
    };
    let ingredients = Arc::new(IngredientStore::new(
        store.clone(),
        alerts,
        AlertDispatcher::spawn(Arc::new(notifier.clone())),
    ));
    let catalog = Arc::new(Catalog::new(store.clone(), ingredients.clone()));
    let cart = Arc::new(CartService::new(store.clone(), catalog.clone()));
    let directory = Arc::new(PrincipalDirectory::new(store.clone()));
    let ledger = OrderLedger::new(cart.clone(), directory, StatusPolicy::Sequential);

    Harness {
        store,
        notifier,
        ingredients,
        catalog,
        cart,
        ledger,
        admin: Principal::admin(PrincipalId::new()),
    }
}

async fn public_pizza(h: &Harness, title: &str, cents: i64) -> PizzaId {
    h.catalog
        .create_public(&h.admin, PizzaRecipe::titled(title), Some(Money::from_cents(cents)))
        .await
        .unwrap()
        .pizza_id()
}

fn customer() -> Principal {
    Principal::customer(PrincipalId::new())
}

mod ingredients {
    use super::*;

    #[tokio::test]
    async fn created_ingredients_round_trip_through_list() {
        let h = harness();

        for kind in IngredientKind::ALL {
            let input = NewIngredient::new(kind, format!("{kind} item"), 42, Money::from_cents(125))
                .with_threshold(7);
            h.ingredients.create(&h.admin, input).await.unwrap();
        }

        for kind in IngredientKind::ALL {
            let listed = h.ingredients.list(&h.admin, kind).await.unwrap();
            assert_eq!(listed.len(), 1);
            assert_eq!(listed[0].kind(), kind);
            assert_eq!(listed[0].stock(), 42);
            assert_eq!(listed[0].threshold(), 7);
            assert_eq!(listed[0].unit_price(), Money::from_cents(125));
        }
    }

    #[tokio::test]
    async fn low_stock_alerts_every_recipient_once() {
        let h = harness();
        let base = h
            .ingredients
            .create(&h.admin, NewIngredient::new(IngredientKind::Base, "Thin", 50, Money::from_cents(300)))
            .await
            .unwrap();

        h.ingredients
            .update_stock(&h.admin, IngredientKind::Base, base.ingredient_id(), 5)
            .await
            .unwrap();
        h.ingredients.dispatcher().drain().await;

        let sent = h.notifier.sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "chef@example.com");
        assert_eq!(sent[1].to, "owner@example.com");
        assert_eq!(sent[0].subject, "Low Stock Alert: Thin");
        assert!(sent[0].html_body.contains("New Stock:</strong> 5"));
        assert!(sent[0].html_body.contains("Threshold:</strong> 20"));

        h.ingredients
            .update_stock(&h.admin, IngredientKind::Base, base.ingredient_id(), 25)
            .await
            .unwrap();
        h.ingredients.dispatcher().drain().await;
        assert_eq!(h.notifier.sent().await.len(), 2);
    }

    #[tokio::test]
    async fn failing_notifier_keeps_the_stock_write() {
        let h = harness();
        h.notifier.set_fail(true);
        let sauce = h
            .ingredients
            .create(&h.admin, NewIngredient::new(IngredientKind::Sauce, "Tomato", 50, Money::from_cents(50)))
            .await
            .unwrap();

        let updated = h
            .ingredients
            .update_stock(&h.admin, IngredientKind::Sauce, sauce.ingredient_id(), 1)
            .await
            .unwrap();
        h.ingredients.dispatcher().drain().await;

        assert_eq!(updated.stock(), 1);
        let stored = h
            .ingredients
            .get(IngredientKind::Sauce, sauce.ingredient_id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.stock(), 1);
        assert!(h.notifier.sent().await.is_empty());
    }
}

mod catalog {
    use super::*;

    #[tokio::test]
    async fn owned_pizzas_are_guarded_for_every_role() {
        let h = harness();
        let owner = customer();
        let custom = h
            .catalog
            .create_custom(&owner, PizzaRecipe::titled("Mine"), None)
            .await
            .unwrap();

        for principal in [&h.admin, &owner] {
            let update = h
                .catalog
                .update_public(principal, custom.pizza_id(), PizzaPatch::default())
                .await;
            assert!(matches!(update, Err(DomainError::InvalidTarget(_))));

            let delete = h.catalog.delete_public(principal, custom.pizza_id()).await;
            assert!(matches!(delete, Err(DomainError::InvalidTarget(_))));
        }
    }

    #[tokio::test]
    async fn patch_clears_references_and_keeps_price() {
        let h = harness();
        let cheese = h
            .ingredients
            .create(&h.admin, NewIngredient::new(IngredientKind::Cheese, "Mozzarella", 50, Money::from_cents(200)))
            .await
            .unwrap();
        let pizza = h
            .catalog
            .create_public(
                &h.admin,
                PizzaRecipe::titled("House").with_cheese(cheese.ingredient_id()),
                Some(Money::from_cents(900)),
            )
            .await
            .unwrap();

        let patch = PizzaPatch {
            title: Some("House Special".to_string()),
            cheese: Some(None),
            ..PizzaPatch::default()
        };
        let revised = h
            .catalog
            .update_public(&h.admin, pizza.pizza_id(), patch)
            .await
            .unwrap();

        assert_eq!(revised.title(), "House Special");
        assert_eq!(revised.recipe().cheese, None);
        assert_eq!(revised.price(), Money::from_cents(900));
    }

    #[tokio::test]
    async fn deleted_ingredient_renders_unavailable() {
        let h = harness();
        let veg = h
            .ingredients
            .create(&h.admin, NewIngredient::new(IngredientKind::Vegetable, "Olive", 50, Money::from_cents(40)))
            .await
            .unwrap();
        let pizza = h
            .catalog
            .create_custom(
                &customer(),
                PizzaRecipe::titled("Olives").with_vegetable(veg.ingredient_id()),
                None,
            )
            .await
            .unwrap();

        h.ingredients
            .delete(&h.admin, IngredientKind::Vegetable, veg.ingredient_id())
            .await
            .unwrap();

        let view = h.catalog.view(&pizza).await.unwrap();
        assert_eq!(
            view.vegetables,
            vec![IngredientRef::Unavailable {
                id: veg.ingredient_id()
            }]
        );
    }
}

mod cart {
    use super::*;

    #[tokio::test]
    async fn place_totals_quantity_times_price() {
        let h = harness();
        let principal = customer();
        let a = public_pizza(&h, "A", 200).await;
        let b = public_pizza(&h, "B", 150).await;

        h.cart.add_line(&principal, a, 2).await.unwrap();
        h.cart.add_line(&principal, b, 1).await.unwrap();
        let order = h.cart.place(&principal).await.unwrap();

        assert_eq!(order.total_price().cents(), 550);
        assert_eq!(order.status(), OrderStatus::InKitchen);
    }

    #[tokio::test]
    async fn placed_order_keeps_its_snapshot_after_catalog_edits() {
        let h = harness();
        let principal = customer();
        let a = public_pizza(&h, "A", 200).await;

        h.cart.add_line(&principal, a, 1).await.unwrap();
        let order = h.cart.place(&principal).await.unwrap();

        let patch = PizzaPatch {
            title: Some("Renamed".to_string()),
            price: Some(Money::from_cents(999)),
            ..PizzaPatch::default()
        };
        h.catalog.update_public(&h.admin, a, patch).await.unwrap();

        let view = h.cart.view(&order).await.unwrap();
        assert_eq!(view.lines[0].title, "A");
        assert_eq!(view.lines[0].unit_price.cents(), 200);
        assert_eq!(view.total_price.cents(), 200);
    }

    #[tokio::test]
    async fn overflowing_total_is_rejected_and_the_cart_stays_open() {
        let h = harness();
        let principal = customer();
        let price = Money::parse_decimal("92233720368547758.07").unwrap();
        let gold = h
            .catalog
            .create_public(&h.admin, PizzaRecipe::titled("Gold Leaf"), Some(price))
            .await
            .unwrap()
            .pizza_id();

        let result = h.cart.add_line(&principal, gold, 2).await;
        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::TotalOverflow))
        ));

        h.cart.add_line(&principal, gold, 1).await.unwrap();
        let cart = h.cart.add_line(&principal, gold, 1).await.unwrap();

        let result = h.cart.place(&principal).await;
        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::TotalOverflow))
        ));
        let result = h.cart.view(&cart).await;
        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::TotalOverflow))
        ));

        let cart = h.cart.set_line_quantity(&principal, gold, 0).await.unwrap();
        assert_eq!(cart.lines().len(), 1);
        let order = h.cart.place(&principal).await.unwrap();
        assert_eq!(order.order_id(), cart.order_id());
        assert_eq!(order.total_price(), price);
    }

    #[tokio::test]
    async fn unknown_line_is_line_not_found() {
        let h = harness();
        let principal = customer();
        let a = public_pizza(&h, "A", 200).await;
        h.cart.add_line(&principal, a, 1).await.unwrap();

        let result = h.cart.set_line_quantity(&principal, PizzaId::new(), 3).await;
        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::LineNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn quantity_zero_removes_the_line() {
        let h = harness();
        let principal = customer();
        let a = public_pizza(&h, "A", 200).await;
        h.cart.add_line(&principal, a, 4).await.unwrap();

        let cart = h.cart.set_line_quantity(&principal, a, 0).await.unwrap();
        assert!(!cart.has_lines());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_share_one_open_cart() {
        let h = harness();
        let principal = customer();
        let a = public_pizza(&h, "A", 200).await;

        // A second service over the same store has its own locks, so only the
        // store's unique key stands between the two and a duplicate cart.
        let rival = Arc::new(CartService::new(h.store.clone(), h.catalog.clone()));

        let mut tasks = Vec::new();
        for i in 0..16 {
            let cart = if i % 2 == 0 { h.cart.clone() } else { rival.clone() };
            let principal = principal.clone();
            tasks.push(tokio::spawn(async move {
                loop {
                    match cart.add_line(&principal, a, 1).await {
                        Ok(order) => return order.order_id(),
                        Err(e) if e.is_conflict() => continue,
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
            }));
        }

        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap());
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);

        let orders = h.cart.list_for_principal(&principal).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].lines().len(), 16);
    }
}

mod ledger {
    use super::*;

    #[tokio::test]
    async fn status_advances_one_step_at_a_time_until_delivered() {
        let h = harness();
        let principal = customer();
        let a = public_pizza(&h, "A", 200).await;
        let cart = h.cart.add_line(&principal, a, 1).await.unwrap();

        for target in [
            OrderStatus::InKitchen,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ] {
            let order = h
                .ledger
                .advance_status(&h.admin, cart.order_id(), target)
                .await
                .unwrap();
            assert_eq!(order.status(), target);
        }

        let result = h
            .ledger
            .advance_status(&h.admin, cart.order_id(), OrderStatus::Delivered)
            .await;
        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::InvalidTransition { .. }))
        ));
    }

    #[tokio::test]
    async fn advancing_empty_cart_fails() {
        let h = harness();
        let principal = customer();
        let a = public_pizza(&h, "A", 200).await;
        let cart = h.cart.add_line(&principal, a, 1).await.unwrap();
        h.cart.remove_line(&principal, a).await.unwrap();

        let result = h
            .ledger
            .advance_status(&h.admin, cart.order_id(), OrderStatus::InKitchen)
            .await;
        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::EmptyCart))
        ));
    }
}
