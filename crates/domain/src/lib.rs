//! Domain layer for the pizza ordering service.
//!
//! This crate provides:
//! - Entity, CommandHandler and event infrastructure over a document store
//! - Ingredient stock with asynchronous low-stock alerts
//! - The pizza catalog (public and custom pizzas) and its pricing
//! - Per-principal carts, order placement and the status ledger

pub mod access;
pub mod aggregate;
pub mod catalog;
pub mod command;
pub mod directory;
pub mod error;
pub mod ingredient;
pub mod locks;
pub mod money;
pub mod notify;
pub mod order;
pub mod pricing;

pub use aggregate::{Aggregate, DomainEvent};
pub use catalog::{Catalog, CatalogError, IngredientRef, Pizza, PizzaPatch, PizzaRecipe, PizzaView};
pub use command::{CommandHandler, CommandResult};
pub use directory::PrincipalDirectory;
pub use error::DomainError;
pub use ingredient::{
    AlertSettings, Ingredient, IngredientError, IngredientKind, IngredientStore, NewIngredient,
};
pub use locks::PrincipalLocks;
pub use money::{Money, ParseMoneyError};
pub use notify::{AlertDispatcher, AlertMessage, InMemoryNotifier, Notifier, NotifyError, TracingNotifier};
pub use order::{
    CartService, LineView, Order, OrderError, OrderLedger, OrderStatus, OrderView, StatusPolicy,
};
