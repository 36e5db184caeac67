//! Shared identifiers and principal claims.

pub mod principal;
pub mod types;

pub use principal::{Principal, Role};
pub use types::{IngredientId, OrderId, PizzaId, PrincipalId};
