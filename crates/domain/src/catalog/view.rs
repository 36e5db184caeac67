use chrono::{DateTime, Utc};
use common::{IngredientId, PizzaId, PrincipalId};
use serde::Serialize;

use crate::ingredient::Ingredient;
use crate::money::{Money, serialize_decimal};

/// An ingredient reference resolved against the current inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum IngredientRef {
    Available {
        id: IngredientId,
        name: String,
        #[serde(serialize_with = "serialize_decimal")]
        unit_price: Money,
    },
    /// The referenced ingredient was deleted.
    Unavailable { id: IngredientId },
}

impl IngredientRef {
    /// Resolves `id` against a lookup result.
    pub fn resolve(id: IngredientId, found: Option<&Ingredient>) -> Self {
        match found {
            Some(ingredient) => IngredientRef::Available {
                id,
                name: ingredient.name().to_string(),
                unit_price: ingredient.unit_price(),
            },
            None => IngredientRef::Unavailable { id },
        }
    }

    /// Unit price, if the ingredient still exists.
    pub fn unit_price(&self) -> Option<Money> {
        match self {
            IngredientRef::Available { unit_price, .. } => Some(*unit_price),
            IngredientRef::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, IngredientRef::Available { .. })
    }
}

/// A pizza with every ingredient reference resolved.
#[derive(Debug, Clone, Serialize)]
pub struct PizzaView {
    pub id: PizzaId,
    pub title: String,
    pub description: Option<String>,
    pub base: Option<IngredientRef>,
    pub sauce: Option<IngredientRef>,
    pub cheese: Option<IngredientRef>,
    pub vegetables: Vec<IngredientRef>,
    #[serde(serialize_with = "serialize_decimal")]
    pub price: Money,
    pub owner: Option<PrincipalId>,
    pub created_at: DateTime<Utc>,
}
