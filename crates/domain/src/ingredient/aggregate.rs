//! Ingredient aggregate implementation.

use chrono::{DateTime, Utc};
use common::IngredientId;
use serde::{Deserialize, Serialize};
use store::Version;

use crate::aggregate::Aggregate;
use crate::money::Money;

use super::{
    DEFAULT_THRESHOLD, IngredientError, IngredientEvent, IngredientKind,
    events::{
        IngredientCreatedData, PriceUpdatedData, StockFellBelowThresholdData, StockUpdatedData,
    },
};

/// Input for creating an ingredient.
#[derive(Debug, Clone)]
pub struct NewIngredient {
    pub kind: IngredientKind,
    pub name: String,
    pub stock: u32,
    pub threshold: u32,
    pub unit_price: Money,
}

impl NewIngredient {
    /// Creates an input with the default restock threshold.
    pub fn new(kind: IngredientKind, name: impl Into<String>, stock: u32, unit_price: Money) -> Self {
        Self {
            kind,
            name: name.into(),
            stock,
            threshold: DEFAULT_THRESHOLD,
            unit_price,
        }
    }

    /// Overrides the restock threshold.
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }
}

/// A stock item of one ingredient kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ingredient {
    id: Option<IngredientId>,

    #[serde(skip)]
    version: Version,

    kind: IngredientKind,
    name: String,
    stock: u32,
    threshold: u32,
    unit_price: Money,
    created_at: DateTime<Utc>,
}

impl Aggregate for Ingredient {
    type Event = IngredientEvent;
    type Error = IngredientError;
    type Id = IngredientId;

    fn aggregate_type() -> &'static str {
        "Ingredient"
    }

    fn id(&self) -> Option<IngredientId> {
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

    fn apply(&mut self, event: Self::Event) {
        match event {
            IngredientEvent::IngredientCreated(data) => {
                self.id = Some(data.ingredient_id);
                self.kind = data.kind;
                self.name = data.name;
                self.stock = data.stock;
                self.threshold = data.threshold;
                self.unit_price = data.unit_price;
                self.created_at = data.created_at;
            }
            IngredientEvent::StockUpdated(data) => self.stock = data.stock,
            IngredientEvent::StockFellBelowThreshold(_) => {}
            IngredientEvent::PriceUpdated(data) => self.unit_price = data.unit_price,
        }
    }
}

// Query methods
impl Ingredient {
    /// Returns the identifier.
    ///
    /// Ingredients loaded from the store always carry one.
    pub fn ingredient_id(&self) -> IngredientId {
        self.id.unwrap_or_default()
    }

    pub fn kind(&self) -> IngredientKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// Returns true if the stock is strictly below the restock threshold.
    pub fn is_below_threshold(&self) -> bool {
        self.stock < self.threshold
    }
}

// Command methods (return events)
impl Ingredient {
    /// Creates the ingredient.
    pub fn create(
        &self,
        ingredient_id: IngredientId,
        input: NewIngredient,
    ) -> Result<Vec<IngredientEvent>, IngredientError> {
        if self.id.is_some() {
            return Err(IngredientError::AlreadyCreated);
        }

        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(IngredientError::EmptyName);
        }

        if input.unit_price.is_negative() {
            return Err(IngredientError::NegativePrice {
                price: input.unit_price.cents(),
            });
        }

        Ok(vec![IngredientEvent::IngredientCreated(IngredientCreatedData {
            ingredient_id,
            kind: input.kind,
            name,
            stock: input.stock,
            threshold: input.threshold,
            unit_price: input.unit_price,
            created_at: Utc::now(),
        })])
    }

    /// Overwrites the stock level.
    ///
    /// Emits `StockFellBelowThreshold` whenever the new level is strictly
    /// below the threshold, including when the level did not change.
    pub fn update_stock(&self, stock: u32) -> Result<Vec<IngredientEvent>, IngredientError> {
        let mut events = vec![IngredientEvent::StockUpdated(StockUpdatedData {
            previous: self.stock,
            stock,
        })];

        if stock < self.threshold {
            events.push(IngredientEvent::StockFellBelowThreshold(
                StockFellBelowThresholdData {
                    stock,
                    threshold: self.threshold,
                },
            ));
        }

        Ok(events)
    }

    /// Changes the unit price.
    pub fn update_price(&self, unit_price: Money) -> Result<Vec<IngredientEvent>, IngredientError> {
        if unit_price.is_negative() {
            return Err(IngredientError::NegativePrice {
                price: unit_price.cents(),
            });
        }

        Ok(vec![IngredientEvent::PriceUpdated(PriceUpdatedData {
            previous: self.unit_price,
            unit_price,
        })])
    }
}
