//! Pizza catalog: public entries and principal-owned custom pizzas.

mod aggregate;
mod events;
mod service;
mod view;

pub use aggregate::{Pizza, PizzaPatch, PizzaRecipe};
pub use events::{PizzaCreatedData, PizzaEvent, PizzaRevisedData};
pub use service::Catalog;
pub use view::{IngredientRef, PizzaView};

use thiserror::Error;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Title is required.
    #[error("Pizza title is required")]
    EmptyTitle,

    /// Price below zero.
    #[error("Invalid price: {price} (must not be negative)")]
    NegativePrice { price: i64 },

    /// Owned pizzas are append-only after creation.
    #[error("Pizza is owned by a principal and cannot be modified")]
    NotPublic,

    /// Pizza is already created.
    #[error("Pizza already created")]
    AlreadyCreated,
}
