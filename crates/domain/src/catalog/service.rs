//! Catalog service.

use std::sync::Arc;

use common::{PizzaId, Principal};
use store::{DocumentStore, OwnerFilter};

use crate::access::require_admin;
use crate::aggregate::Aggregate;
use crate::command::CommandHandler;
use crate::error::DomainError;
use crate::ingredient::IngredientStore;
use crate::money::Money;
use crate::pricing::recipe_price;

use super::{IngredientRef, Pizza, PizzaPatch, PizzaRecipe, PizzaView};

const COLLECTION: &str = "pizzas";

/// Service managing public catalog entries and custom pizzas.
pub struct Catalog<S: DocumentStore> {
    pizzas: CommandHandler<S, Pizza>,
    ingredients: Arc<IngredientStore<S>>,
}

impl<S: DocumentStore> Catalog<S> {
    /// Creates the service over `store`, resolving references through `ingredients`.
    pub fn new(store: S, ingredients: Arc<IngredientStore<S>>) -> Self {
        Self {
            pizzas: CommandHandler::new(store, COLLECTION),
            ingredients,
        }
    }

    /// Adds a public catalog entry.
    ///
    /// Without an explicit price the entry is priced at the sum of its
    /// ingredients' current unit prices.
    #[tracing::instrument(skip(self, principal), fields(principal = %principal.id))]
    pub async fn create_public(
        &self,
        principal: &Principal,
        recipe: PizzaRecipe,
        price: Option<Money>,
    ) -> Result<Pizza, DomainError> {
        require_admin(principal, "create catalog pizzas")?;
        self.check_references(&recipe).await?;

        let price = match price {
            Some(price) => price,
            None => self.computed_price(&recipe).await?,
        };

        let pizza_id = PizzaId::new();
        let result = self
            .pizzas
            .create(|pizza| pizza.create(pizza_id, recipe, price, None))
            .await?;

        tracing::info!(pizza = %pizza_id, "catalog pizza created");
        Ok(result.aggregate)
    }

    /// Stores a principal-authored pizza.
    ///
    /// The price is always recomputed from current ingredient prices; a
    /// supplied price that disagrees is ignored.
    #[tracing::instrument(skip(self, principal), fields(principal = %principal.id))]
    pub async fn create_custom(
        &self,
        principal: &Principal,
        recipe: PizzaRecipe,
        supplied_price: Option<Money>,
    ) -> Result<Pizza, DomainError> {
        self.check_references(&recipe).await?;

        let price = self.computed_price(&recipe).await?;
        if let Some(supplied) = supplied_price.filter(|p| *p != price) {
            tracing::warn!(
                supplied = %supplied,
                computed = %price,
                "ignoring client-supplied custom pizza price"
            );
        }

        let pizza_id = PizzaId::new();
        let owner = principal.id;
        let result = self
            .pizzas
            .create(|pizza| pizza.create(pizza_id, recipe, price, Some(owner)))
            .await?;

        tracing::info!(pizza = %pizza_id, "custom pizza created");
        Ok(result.aggregate)
    }

    /// Edits a public pizza.
    ///
    /// Fails with `InvalidTarget` for a missing or owned pizza regardless of
    /// the caller's role.
    #[tracing::instrument(skip(self, principal), fields(principal = %principal.id))]
    pub async fn update_public(
        &self,
        principal: &Principal,
        id: PizzaId,
        patch: PizzaPatch,
    ) -> Result<Pizza, DomainError> {
        let pizza = self.load_public(id).await?;
        require_admin(principal, "edit catalog pizzas")?;

        let introduced = PizzaRecipe {
            base: patch.base.flatten(),
            sauce: patch.sauce.flatten(),
            cheese: patch.cheese.flatten(),
            vegetables: patch.vegetables.clone().unwrap_or_default(),
            ..PizzaRecipe::default()
        };
        self.check_references(&introduced).await?;

        let result = self
            .pizzas
            .execute_on(pizza, |pizza| pizza.revise(&patch))
            .await?;
        Ok(result.aggregate)
    }

    /// Removes a public pizza. Same guard as [`Catalog::update_public`].
    #[tracing::instrument(skip(self, principal), fields(principal = %principal.id))]
    pub async fn delete_public(&self, principal: &Principal, id: PizzaId) -> Result<(), DomainError> {
        self.load_public(id).await?;
        require_admin(principal, "delete catalog pizzas")?;

        if !self.pizzas.delete(id).await? {
            return Err(DomainError::InvalidTarget(format!("pizza {id} does not exist")));
        }

        tracing::info!(pizza = %id, "catalog pizza deleted");
        Ok(())
    }

    /// Public pizzas plus the principal's own custom pizzas.
    #[tracing::instrument(skip(self, principal), fields(principal = %principal.id))]
    pub async fn list_visible(&self, principal: &Principal) -> Result<Vec<Pizza>, DomainError> {
        let owner = principal.id.as_uuid();
        self.pizzas
            .query(|q| q.owner(OwnerFilter::UnownedOr(owner)))
            .await
    }

    /// Public pizzas only (administrator view).
    #[tracing::instrument(skip(self, principal), fields(principal = %principal.id))]
    pub async fn list_public(&self, principal: &Principal) -> Result<Vec<Pizza>, DomainError> {
        require_admin(principal, "list catalog pizzas")?;
        self.pizzas.query(|q| q.owner(OwnerFilter::Unowned)).await
    }

    /// Looks up a pizza without visibility checks.
    pub async fn get(&self, id: PizzaId) -> Result<Option<Pizza>, DomainError> {
        self.pizzas.load(id).await
    }

    /// Looks up a pizza the principal may order.
    ///
    /// Missing pizzas are `NotFound`; another principal's custom pizza is
    /// `InvalidTarget`.
    pub async fn visible_pizza(
        &self,
        principal: &Principal,
        id: PizzaId,
    ) -> Result<Pizza, DomainError> {
        let pizza = self.pizzas.load_existing(id).await?;
        if !pizza.is_visible_to(principal.id) {
            return Err(DomainError::InvalidTarget(format!(
                "pizza {id} belongs to another principal"
            )));
        }
        Ok(pizza)
    }

    /// Resolves every ingredient reference of `pizza`.
    pub async fn view(&self, pizza: &Pizza) -> Result<PizzaView, DomainError> {
        let recipe = pizza.recipe();
        let mut resolved = Vec::new();
        for (kind, id) in recipe.references() {
            let found = self.ingredients.get(kind, id).await?;
            resolved.push(IngredientRef::resolve(id, found.as_ref()));
        }

        // `references` yields base, sauce, cheese (when set) then vegetables.
        let mut resolved = resolved.into_iter();
        let mut take_if = |present: bool| if present { resolved.next() } else { None };
        let base = take_if(recipe.base.is_some());
        let sauce = take_if(recipe.sauce.is_some());
        let cheese = take_if(recipe.cheese.is_some());
        let vegetables = resolved.collect();

        Ok(PizzaView {
            id: pizza.pizza_id(),
            title: recipe.title,
            description: recipe.description,
            base,
            sauce,
            cheese,
            vegetables,
            price: pizza.price(),
            owner: pizza.owner_id(),
            created_at: pizza.created_at(),
        })
    }

    /// Resolves a list of pizzas.
    pub async fn views(&self, pizzas: &[Pizza]) -> Result<Vec<PizzaView>, DomainError> {
        let mut views = Vec::with_capacity(pizzas.len());
        for pizza in pizzas {
            views.push(self.view(pizza).await?);
        }
        Ok(views)
    }

    async fn load_public(&self, id: PizzaId) -> Result<Pizza, DomainError> {
        match self.pizzas.load(id).await? {
            Some(pizza) if pizza.is_public() => Ok(pizza),
            Some(_) => Err(DomainError::InvalidTarget(format!(
                "pizza {id} is a custom pizza and cannot be modified"
            ))),
            None => Err(DomainError::InvalidTarget(format!("pizza {id} does not exist"))),
        }
    }

    async fn check_references(&self, recipe: &PizzaRecipe) -> Result<(), DomainError> {
        for (kind, id) in recipe.references() {
            if self.ingredients.get(kind, id).await?.is_none() {
                return Err(DomainError::InvalidTarget(format!(
                    "{kind} ingredient {id} does not exist"
                )));
            }
        }
        Ok(())
    }

    async fn computed_price(&self, recipe: &PizzaRecipe) -> Result<Money, DomainError> {
        let mut prices = Vec::new();
        for (kind, id) in recipe.references() {
            prices.push(self.ingredients.get(kind, id).await?.map(|i| i.unit_price()));
        }
        recipe_price(prices).ok_or_else(|| {
            DomainError::Validation("computed pizza price is too large".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingredient::{AlertSettings, IngredientKind, NewIngredient};
    use crate::notify::{AlertDispatcher, TracingNotifier};
    use common::{IngredientId, PrincipalId};
    use store::InMemoryDocumentStore;

    struct Fixture {
        catalog: Catalog<InMemoryDocumentStore>,
        ingredients: Arc<IngredientStore<InMemoryDocumentStore>>,
        admin: Principal,
    }

    fn fixture() -> Fixture {
        let store = InMemoryDocumentStore::new();
        let ingredients = Arc::new(IngredientStore::new(
            store.clone(),
            AlertSettings::default(),
            AlertDispatcher::spawn(Arc::new(TracingNotifier)),
        ));
        Fixture {
            catalog: Catalog::new(store, ingredients.clone()),
            ingredients,
            admin: Principal::admin(PrincipalId::new()),
        }
    }

    async fn ingredient(f: &Fixture, kind: IngredientKind, cents: i64) -> IngredientId {
        f.ingredients
            .create(&f.admin, NewIngredient::new(kind, "Item", 50, Money::from_cents(cents)))
            .await
            .unwrap()
            .ingredient_id()
    }

    #[tokio::test]
    async fn test_custom_price_is_recomputed() {
        let f = fixture();
        let base = ingredient(&f, IngredientKind::Base, 300).await;
        let veg = ingredient(&f, IngredientKind::Vegetable, 75).await;
        let customer = Principal::customer(PrincipalId::new());

        let recipe = PizzaRecipe::titled("Mine").with_base(base).with_vegetable(veg);
        let pizza = f
            .catalog
            .create_custom(&customer, recipe, Some(Money::from_cents(1)))
            .await
            .unwrap();

        assert_eq!(pizza.price().cents(), 375);
        assert_eq!(pizza.owner_id(), Some(customer.id));
    }

    #[tokio::test]
    async fn test_public_price_prefers_admin_value() {
        let f = fixture();
        let base = ingredient(&f, IngredientKind::Base, 300).await;
        let recipe = PizzaRecipe::titled("House").with_base(base);

        let priced = f
            .catalog
            .create_public(&f.admin, recipe.clone(), Some(Money::from_cents(999)))
            .await
            .unwrap();
        assert_eq!(priced.price().cents(), 999);

        let computed = f.catalog.create_public(&f.admin, recipe, None).await.unwrap();
        assert_eq!(computed.price().cents(), 300);
    }

    #[tokio::test]
    async fn test_reference_of_wrong_kind_is_rejected() {
        let f = fixture();
        let cheese = ingredient(&f, IngredientKind::Cheese, 100).await;

        let recipe = PizzaRecipe::titled("Odd").with_base(cheese);
        let result = f.catalog.create_public(&f.admin, recipe, None).await;
        assert!(matches!(result, Err(DomainError::InvalidTarget(_))));
    }

    #[tokio::test]
    async fn test_owned_pizza_guard_applies_to_admins() {
        let f = fixture();
        let customer = Principal::customer(PrincipalId::new());
        let pizza = f
            .catalog
            .create_custom(&customer, PizzaRecipe::titled("Mine"), None)
            .await
            .unwrap();

        let update = f
            .catalog
            .update_public(&f.admin, pizza.pizza_id(), PizzaPatch::default())
            .await;
        assert!(matches!(update, Err(DomainError::InvalidTarget(_))));

        let delete = f.catalog.delete_public(&f.admin, pizza.pizza_id()).await;
        assert!(matches!(delete, Err(DomainError::InvalidTarget(_))));

        let missing = f.catalog.delete_public(&customer, PizzaId::new()).await;
        assert!(matches!(missing, Err(DomainError::InvalidTarget(_))));
    }

    #[tokio::test]
    async fn test_customer_cannot_edit_public_pizza() {
        let f = fixture();
        let pizza = f
            .catalog
            .create_public(&f.admin, PizzaRecipe::titled("House"), None)
            .await
            .unwrap();
        let customer = Principal::customer(PrincipalId::new());

        let result = f
            .catalog
            .update_public(&customer, pizza.pizza_id(), PizzaPatch::default())
            .await;
        assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_listings() {
        let f = fixture();
        let me = Principal::customer(PrincipalId::new());
        let other = Principal::customer(PrincipalId::new());

        f.catalog
            .create_public(&f.admin, PizzaRecipe::titled("House"), None)
            .await
            .unwrap();
        f.catalog
            .create_custom(&me, PizzaRecipe::titled("Mine"), None)
            .await
            .unwrap();
        f.catalog
            .create_custom(&other, PizzaRecipe::titled("Theirs"), None)
            .await
            .unwrap();

        let visible: Vec<_> = f
            .catalog
            .list_visible(&me)
            .await
            .unwrap()
            .iter()
            .map(|p| p.title().to_string())
            .collect();
        assert_eq!(visible, vec!["House", "Mine"]);

        assert_eq!(f.catalog.list_public(&f.admin).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_view_marks_deleted_ingredient_unavailable() {
        let f = fixture();
        let base = ingredient(&f, IngredientKind::Base, 300).await;
        let veg = ingredient(&f, IngredientKind::Vegetable, 50).await;
        let pizza = f
            .catalog
            .create_public(
                &f.admin,
                PizzaRecipe::titled("House").with_base(base).with_vegetable(veg),
                None,
            )
            .await
            .unwrap();

        f.ingredients
            .delete(&f.admin, IngredientKind::Base, base)
            .await
            .unwrap();

        let view = f.catalog.view(&pizza).await.unwrap();
        assert_eq!(view.base, Some(IngredientRef::Unavailable { id: base }));
        assert!(view.sauce.is_none());
        assert_eq!(view.vegetables.len(), 1);
        assert!(view.vegetables[0].is_available());
        assert_eq!(view.price.cents(), 350);
    }
}
