//! Order domain events.

use chrono::{DateTime, Utc};
use common::{OrderId, PizzaId, PrincipalId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::money::Money;

use super::{LineSnapshot, OrderStatus};

/// Events that can occur on an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    /// An empty cart was opened for a principal.
    OrderOpened(OrderOpenedData),

    /// A line was appended to the cart.
    LineAdded(LineAddedData),

    /// The first line for a pizza got a new quantity.
    LineQuantityChanged(LineQuantityChangedData),

    /// The first line for a pizza was removed.
    LineRemoved(LineRemovedData),

    /// The cart was priced, frozen and sent to the kitchen.
    OrderPlaced(OrderPlacedData),

    /// An administrator moved a placed order to another status.
    StatusAdvanced(StatusAdvancedData),
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderOpened(_) => "OrderOpened",
            OrderEvent::LineAdded(_) => "LineAdded",
            OrderEvent::LineQuantityChanged(_) => "LineQuantityChanged",
            OrderEvent::LineRemoved(_) => "LineRemoved",
            OrderEvent::OrderPlaced(_) => "OrderPlaced",
            OrderEvent::StatusAdvanced(_) => "StatusAdvanced",
        }
    }
}

/// Data for OrderOpened event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderOpenedData {
    pub order_id: OrderId,
    pub principal_id: PrincipalId,
    pub created_at: DateTime<Utc>,
}

/// Data for LineAdded event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineAddedData {
    pub pizza_id: PizzaId,
    pub quantity: u32,
}

/// Data for LineQuantityChanged event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineQuantityChangedData {
    pub pizza_id: PizzaId,
    pub previous: u32,
    pub quantity: u32,
}

/// Data for LineRemoved event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineRemovedData {
    pub pizza_id: PizzaId,
}

/// Data for OrderPlaced event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlacedData {
    /// Title and unit price per line, in line order.
    pub snapshots: Vec<LineSnapshot>,
    pub total_price: Money,
    pub placed_at: DateTime<Utc>,
}

/// Data for StatusAdvanced event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusAdvancedData {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub changed_at: DateTime<Utc>,
}
