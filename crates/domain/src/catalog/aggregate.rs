//! Pizza aggregate implementation.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use common::{IngredientId, PizzaId, PrincipalId};
use serde::{Deserialize, Serialize};
use store::Version;
use uuid::Uuid;

use crate::aggregate::Aggregate;
use crate::ingredient::IngredientKind;
use crate::money::Money;

use super::{
    CatalogError, PizzaEvent,
    events::{PizzaCreatedData, PizzaRevisedData},
};

/// The composable part of a pizza: title, description and ingredient references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PizzaRecipe {
    pub title: String,
    pub description: Option<String>,
    pub base: Option<IngredientId>,
    pub sauce: Option<IngredientId>,
    pub cheese: Option<IngredientId>,
    pub vegetables: BTreeSet<IngredientId>,
}

impl PizzaRecipe {
    /// Creates a recipe with only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_base(mut self, id: IngredientId) -> Self {
        self.base = Some(id);
        self
    }

    pub fn with_sauce(mut self, id: IngredientId) -> Self {
        self.sauce = Some(id);
        self
    }

    pub fn with_cheese(mut self, id: IngredientId) -> Self {
        self.cheese = Some(id);
        self
    }

    pub fn with_vegetable(mut self, id: IngredientId) -> Self {
        self.vegetables.insert(id);
        self
    }

    /// Every ingredient reference paired with the kind it must belong to.
    pub fn references(&self) -> Vec<(IngredientKind, IngredientId)> {
        let singles = [
            (IngredientKind::Base, self.base),
            (IngredientKind::Sauce, self.sauce),
            (IngredientKind::Cheese, self.cheese),
        ];

        singles
            .into_iter()
            .filter_map(|(kind, id)| id.map(|id| (kind, id)))
            .chain(
                self.vegetables
                    .iter()
                    .map(|id| (IngredientKind::Vegetable, *id)),
            )
            .collect()
    }
}

/// Partial update of a public pizza.
///
/// Outer `None` leaves a field unchanged; `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct PizzaPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub base: Option<Option<IngredientId>>,
    pub sauce: Option<Option<IngredientId>>,
    pub cheese: Option<Option<IngredientId>>,
    pub vegetables: Option<BTreeSet<IngredientId>>,
    pub price: Option<Money>,
}

impl PizzaPatch {
    /// Applies the patch to `recipe`, returning the edited copy.
    pub fn apply_to(&self, recipe: &PizzaRecipe) -> PizzaRecipe {
        PizzaRecipe {
            title: self.title.clone().unwrap_or_else(|| recipe.title.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| recipe.description.clone()),
            base: self.base.unwrap_or(recipe.base),
            sauce: self.sauce.unwrap_or(recipe.sauce),
            cheese: self.cheese.unwrap_or(recipe.cheese),
            vegetables: self
                .vegetables
                .clone()
                .unwrap_or_else(|| recipe.vegetables.clone()),
        }
    }
}

/// A pizza definition, public (no owner) or custom (owned by a principal).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pizza {
    id: Option<PizzaId>,

    #[serde(skip)]
    version: Version,

    title: String,
    description: Option<String>,
    base: Option<IngredientId>,
    sauce: Option<IngredientId>,
    cheese: Option<IngredientId>,
    vegetables: BTreeSet<IngredientId>,
    price: Money,
    owner: Option<PrincipalId>,
    created_at: DateTime<Utc>,
}

impl Aggregate for Pizza {
    type Event = PizzaEvent;
    type Error = CatalogError;
    type Id = PizzaId;

    fn aggregate_type() -> &'static str {
        "Pizza"
    }

    fn id(&self) -> Option<PizzaId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn owner(&self) -> Option<Uuid> {
        self.owner.map(Into::into)
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            PizzaEvent::PizzaCreated(data) => {
                self.id = Some(data.pizza_id);
                self.title = data.title;
                self.description = data.description;
                self.base = data.base;
                self.sauce = data.sauce;
                self.cheese = data.cheese;
                self.vegetables = data.vegetables;
                self.price = data.price;
                self.owner = data.owner;
                self.created_at = data.created_at;
            }
            PizzaEvent::PizzaRevised(data) => {
                self.title = data.title;
                self.description = data.description;
                self.base = data.base;
                self.sauce = data.sauce;
                self.cheese = data.cheese;
                self.vegetables = data.vegetables;
                self.price = data.price;
            }
        }
    }
}

// Query methods
impl Pizza {
    /// Returns the identifier.
    ///
    /// Pizzas loaded from the store always carry one.
    pub fn pizza_id(&self) -> PizzaId {
        self.id.unwrap_or_default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn owner_id(&self) -> Option<PrincipalId> {
        self.owner
    }

    /// Returns true for administrator-managed catalog entries.
    pub fn is_public(&self) -> bool {
        self.owner.is_none()
    }

    /// Returns true if `principal` may see this pizza (public or own).
    pub fn is_visible_to(&self, principal: PrincipalId) -> bool {
        self.owner.is_none_or(|owner| owner == principal)
    }

    /// Returns a copy of the recipe.
    pub fn recipe(&self) -> PizzaRecipe {
        PizzaRecipe {
            title: self.title.clone(),
            description: self.description.clone(),
            base: self.base,
            sauce: self.sauce,
            cheese: self.cheese,
            vegetables: self.vegetables.clone(),
        }
    }
}

// Command methods (return events)
impl Pizza {
    /// Creates the pizza.
    pub fn create(
        &self,
        pizza_id: PizzaId,
        recipe: PizzaRecipe,
        price: Money,
        owner: Option<PrincipalId>,
    ) -> Result<Vec<PizzaEvent>, CatalogError> {
        if self.id.is_some() {
            return Err(CatalogError::AlreadyCreated);
        }

        let recipe = validate(recipe, price)?;

        Ok(vec![PizzaEvent::PizzaCreated(PizzaCreatedData {
            pizza_id,
            title: recipe.title,
            description: recipe.description,
            base: recipe.base,
            sauce: recipe.sauce,
            cheese: recipe.cheese,
            vegetables: recipe.vegetables,
            price,
            owner,
            created_at: Utc::now(),
        })])
    }

    /// Edits a public pizza. The price is kept unless the patch sets one.
    pub fn revise(&self, patch: &PizzaPatch) -> Result<Vec<PizzaEvent>, CatalogError> {
        if !self.is_public() {
            return Err(CatalogError::NotPublic);
        }

        let price = patch.price.unwrap_or(self.price);
        let recipe = validate(patch.apply_to(&self.recipe()), price)?;

        Ok(vec![PizzaEvent::PizzaRevised(PizzaRevisedData {
            title: recipe.title,
            description: recipe.description,
            base: recipe.base,
            sauce: recipe.sauce,
            cheese: recipe.cheese,
            vegetables: recipe.vegetables,
            price,
        })])
    }
}

fn validate(mut recipe: PizzaRecipe, price: Money) -> Result<PizzaRecipe, CatalogError> {
    recipe.title = recipe.title.trim().to_string();
    if recipe.title.is_empty() {
        return Err(CatalogError::EmptyTitle);
    }

    if price.is_negative() {
        return Err(CatalogError::NegativePrice {
            price: price.cents(),
        });
    }

    recipe.description = recipe
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    Ok(recipe)
}
