//! Pizza domain events.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use common::{IngredientId, PizzaId, PrincipalId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::money::Money;

/// Events that can occur on a pizza.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PizzaEvent {
    /// Pizza was added to the catalog or submitted as a custom pizza.
    PizzaCreated(PizzaCreatedData),

    /// A public pizza was edited by an administrator.
    PizzaRevised(PizzaRevisedData),
}

impl DomainEvent for PizzaEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PizzaEvent::PizzaCreated(_) => "PizzaCreated",
            PizzaEvent::PizzaRevised(_) => "PizzaRevised",
        }
    }
}

/// Data for PizzaCreated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PizzaCreatedData {
    pub pizza_id: PizzaId,
    pub title: String,
    pub description: Option<String>,
    pub base: Option<IngredientId>,
    pub sauce: Option<IngredientId>,
    pub cheese: Option<IngredientId>,
    pub vegetables: BTreeSet<IngredientId>,
    pub price: Money,
    pub owner: Option<PrincipalId>,
    pub created_at: DateTime<Utc>,
}

/// Data for PizzaRevised event. Carries the full post-edit recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PizzaRevisedData {
    pub title: String,
    pub description: Option<String>,
    pub base: Option<IngredientId>,
    pub sauce: Option<IngredientId>,
    pub cheese: Option<IngredientId>,
    pub vegetables: BTreeSet<IngredientId>,
    pub price: Money,
}
