//! Ingredient domain events.

use chrono::{DateTime, Utc};
use common::IngredientId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::money::Money;

use super::IngredientKind;

/// Events that can occur on an ingredient.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum IngredientEvent {
    /// Ingredient was added to the inventory.
    IngredientCreated(IngredientCreatedData),

    /// Stock level was overwritten.
    StockUpdated(StockUpdatedData),

    /// A stock write left the level strictly below the threshold.
    StockFellBelowThreshold(StockFellBelowThresholdData),

    /// Unit price was changed.
    PriceUpdated(PriceUpdatedData),
}

impl DomainEvent for IngredientEvent {
    fn event_type(&self) -> &'static str {
        match self {
            IngredientEvent::IngredientCreated(_) => "IngredientCreated",
            IngredientEvent::StockUpdated(_) => "StockUpdated",
            IngredientEvent::StockFellBelowThreshold(_) => "StockFellBelowThreshold",
            IngredientEvent::PriceUpdated(_) => "PriceUpdated",
        }
    }
}

/// Data for IngredientCreated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientCreatedData {
    pub ingredient_id: IngredientId,
    pub kind: IngredientKind,
    pub name: String,
    pub stock: u32,
    pub threshold: u32,
    pub unit_price: Money,
    pub created_at: DateTime<Utc>,
}

/// Data for StockUpdated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockUpdatedData {
    pub previous: u32,
    pub stock: u32,
}

/// Data for StockFellBelowThreshold event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockFellBelowThresholdData {
    pub stock: u32,
    pub threshold: u32,
}

/// Data for PriceUpdated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceUpdatedData {
    pub previous: Money,
    pub unit_price: Money,
}
