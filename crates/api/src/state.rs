//! Shared application state.

use std::sync::Arc;

use domain::{
    AlertDispatcher, AlertSettings, CartService, Catalog, IngredientStore, Notifier, OrderLedger,
    PrincipalDirectory, StatusPolicy,
};
use store::DocumentStore;

/// Services shared by every handler.
pub struct AppState<S: DocumentStore> {
    pub ingredients: Arc<IngredientStore<S>>,
    pub catalog: Arc<Catalog<S>>,
    pub cart: Arc<CartService<S>>,
    pub ledger: OrderLedger<S>,
    pub directory: Arc<PrincipalDirectory<S>>,
}

impl<S: DocumentStore + Clone + 'static> AppState<S> {
    /// Wires the services over one store.
    ///
    /// Must be called inside a tokio runtime; the alert dispatcher spawns its
    /// delivery task here.
    pub fn new(
        store: S,
        alerts: AlertSettings,
        notifier: Arc<dyn Notifier>,
        policy: StatusPolicy,
    ) -> Self {
        let ingredients = Arc::new(IngredientStore::new(
            store.clone(),
            alerts,
            AlertDispatcher::spawn(notifier),
        ));
        let catalog = Arc::new(Catalog::new(store.clone(), ingredients.clone()));
        let cart = Arc::new(CartService::new(store.clone(), catalog.clone()));
        let directory = Arc::new(PrincipalDirectory::new(store));
        let ledger = OrderLedger::new(cart.clone(), directory.clone(), policy);

        Self {
            ingredients,
            catalog,
            cart,
            ledger,
            directory,
        }
    }
}
