//! Order status state machine.

use serde::{Deserialize, Serialize};

/// The delivery status of an order.
///
/// State transitions:
/// ```text
/// Received ──► InKitchen ──► OutForDelivery ──► Delivered
/// (open cart)  (placed)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// The open cart; lines can be added and changed.
    #[default]
    Received,

    /// Placed; total stamped and lines frozen.
    InKitchen,

    /// Handed to delivery.
    OutForDelivery,

    /// Delivered (terminal state).
    Delivered,
}

impl OrderStatus {
    /// Every status, in pipeline order.
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Received,
        OrderStatus::InKitchen,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ];

    /// The immediate successor in the pipeline.
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Received => Some(OrderStatus::InKitchen),
            OrderStatus::InKitchen => Some(OrderStatus::OutForDelivery),
            OrderStatus::OutForDelivery => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }

    /// Returns true if lines can be modified in this status.
    pub fn can_modify_lines(&self) -> bool {
        matches!(self, OrderStatus::Received)
    }

    /// Returns true once the order has left the cart.
    pub fn is_placed(&self) -> bool {
        !matches!(self, OrderStatus::Received)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Received => "Received",
            OrderStatus::InKitchen => "InKitchen",
            OrderStatus::OutForDelivery => "OutForDelivery",
            OrderStatus::Delivered => "Delivered",
        }
    }

    /// Customer-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Received => "Order Received",
            OrderStatus::InKitchen => "In the Kitchen",
            OrderStatus::OutForDelivery => "Sent to Delivery",
            OrderStatus::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A status name that matches neither a variant nor a label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl std::str::FromStr for OrderStatus {
    type Err = UnknownStatus;

    /// Accepts variant names in any case or separator style, and the display labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "received" | "orderreceived" | "orderrecieved" => Ok(OrderStatus::Received),
            "inkitchen" | "inthekitchen" => Ok(OrderStatus::InKitchen),
            "outfordelivery" | "senttodelivery" => Ok(OrderStatus::OutForDelivery),
            "delivered" => Ok(OrderStatus::Delivered),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// Which status changes an administrator may make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusPolicy {
    /// Only the immediate successor.
    #[default]
    Sequential,

    /// Any placed status other than the current one, forward or backward.
    Unrestricted,
}

impl StatusPolicy {
    /// Returns true if moving from `from` to `to` is allowed.
    ///
    /// Under both policies a delivered order is final and nothing moves back
    /// to `Received`.
    pub fn permits(&self, from: OrderStatus, to: OrderStatus) -> bool {
        if from.is_terminal() || to == OrderStatus::Received || from == to {
            return false;
        }
        match self {
            StatusPolicy::Sequential => from.next() == Some(to),
            StatusPolicy::Unrestricted => true,
        }
    }
}

impl std::str::FromStr for StatusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(StatusPolicy::Sequential),
            "unrestricted" => Ok(StatusPolicy::Unrestricted),
            other => Err(format!("unknown status policy: {other}")),
        }
    }
}
