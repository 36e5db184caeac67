//! Ingredient inventory: stock levels, thresholds and unit prices.

mod aggregate;
mod events;
mod kind;
mod service;

pub use aggregate::{Ingredient, NewIngredient};
pub use events::{
    IngredientCreatedData, IngredientEvent, PriceUpdatedData, StockFellBelowThresholdData,
    StockUpdatedData,
};
pub use kind::{IngredientKind, UnknownKind};
pub use service::{AlertSettings, IngredientStore};

use thiserror::Error;

/// Restock threshold applied when none is given.
pub const DEFAULT_THRESHOLD: u32 = 20;

/// Errors that can occur during ingredient operations.
#[derive(Debug, Error)]
pub enum IngredientError {
    /// Name is required.
    #[error("Ingredient name is required")]
    EmptyName,

    /// Unit price below zero.
    #[error("Invalid price: {price} (must not be negative)")]
    NegativePrice { price: i64 },

    /// Ingredient is already created.
    #[error("Ingredient already created")]
    AlreadyCreated,
}
