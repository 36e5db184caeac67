use serde::{Deserialize, Serialize};

/// The four ingredient families a pizza is assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IngredientKind {
    #[default]
    Base,
    Sauce,
    Cheese,
    #[serde(rename = "veggies", alias = "vegetable")]
    Vegetable,
}

impl IngredientKind {
    /// Every kind, in display order.
    pub const ALL: [IngredientKind; 4] = [
        IngredientKind::Base,
        IngredientKind::Sauce,
        IngredientKind::Cheese,
        IngredientKind::Vegetable,
    ];

    /// Returns the wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            IngredientKind::Base => "base",
            IngredientKind::Sauce => "sauce",
            IngredientKind::Cheese => "cheese",
            IngredientKind::Vegetable => "veggies",
        }
    }

    /// Document collection holding ingredients of this kind.
    pub fn collection(&self) -> &'static str {
        match self {
            IngredientKind::Base => "ingredients.base",
            IngredientKind::Sauce => "ingredients.sauce",
            IngredientKind::Cheese => "ingredients.cheese",
            IngredientKind::Vegetable => "ingredients.veggies",
        }
    }
}

impl std::fmt::Display for IngredientKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An ingredient kind name that is not one of the four families.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid ingredient type: {0}")]
pub struct UnknownKind(pub String);

impl std::str::FromStr for IngredientKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base" => Ok(IngredientKind::Base),
            "sauce" => Ok(IngredientKind::Sauce),
            "cheese" => Ok(IngredientKind::Cheese),
            "veggies" | "vegetable" => Ok(IngredientKind::Vegetable),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}
