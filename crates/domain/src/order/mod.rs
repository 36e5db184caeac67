//! Order aggregate, cart service and administrator ledger.

mod aggregate;
mod events;
mod ledger;
mod service;
mod state;
mod view;

pub use aggregate::{LineItem, LineSnapshot, Order, open_cart_key};
pub use events::{
    LineAddedData, LineQuantityChangedData, LineRemovedData, OrderEvent, OrderOpenedData,
    OrderPlacedData, StatusAdvancedData,
};
pub use ledger::OrderLedger;
pub use service::CartService;
pub use state::{OrderStatus, StatusPolicy, UnknownStatus};
pub use view::{LineView, OrderView};

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The principal has no open cart.
    #[error("No open order")]
    NoOpenOrder,

    /// No line in the cart references the pizza.
    #[error("Line not found: {pizza_id}")]
    LineNotFound { pizza_id: String },

    /// Placing requires at least one line.
    #[error("Cart is empty")]
    EmptyCart,

    /// Invalid quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: i64 },

    /// The status change is not allowed by the active policy.
    #[error("Invalid status transition: cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Lines can only change while the order is the open cart.
    #[error("Order is {status} and can no longer be modified")]
    NotModifiable { status: OrderStatus },

    /// Each line needs exactly one price snapshot when placing.
    #[error("Cannot price order: {lines} lines but {priced} snapshots")]
    PricingMismatch { lines: usize, priced: usize },

    /// A line total or the order total does not fit in an amount.
    #[error("Order total is too large")]
    TotalOverflow,

    /// Order is already created.
    #[error("Order already created")]
    AlreadyCreated,
}
