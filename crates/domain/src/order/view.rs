use chrono::{DateTime, Utc};
use common::{OrderId, PizzaId, PrincipalId};
use serde::Serialize;

use crate::aggregate::Aggregate;
use crate::money::{Money, serialize_decimal};
use crate::pricing::line_total;

use super::{Order, OrderError, OrderStatus};

/// Title shown for a cart line whose pizza was deleted.
pub(crate) const UNAVAILABLE_TITLE: &str = "unavailable";

/// A line with its pizza title and price resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineView {
    pub pizza_id: PizzaId,
    pub title: String,
    #[serde(serialize_with = "serialize_decimal")]
    pub unit_price: Money,
    pub quantity: u32,
    #[serde(serialize_with = "serialize_decimal")]
    pub line_total: Money,
    /// False when an open cart references a pizza that no longer exists.
    pub available: bool,
}

impl LineView {
    pub(crate) fn priced(
        pizza_id: PizzaId,
        title: String,
        unit_price: Money,
        quantity: u32,
    ) -> Result<Self, OrderError> {
        Ok(Self {
            pizza_id,
            title,
            unit_price,
            quantity,
            line_total: line_total(unit_price, quantity).ok_or(OrderError::TotalOverflow)?,
            available: true,
        })
    }

    pub(crate) fn unavailable(pizza_id: PizzaId, quantity: u32) -> Self {
        Self {
            pizza_id,
            title: UNAVAILABLE_TITLE.to_string(),
            unit_price: Money::zero(),
            quantity,
            line_total: Money::zero(),
            available: false,
        }
    }
}

/// An order as shown to callers.
///
/// While the order is the open cart, lines carry live catalog values and
/// `total_price` is the running subtotal. Placed orders show their frozen
/// snapshot and stamped total.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: OrderId,
    pub principal_id: PrincipalId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_name: Option<String>,
    pub status: OrderStatus,
    pub status_label: &'static str,
    pub lines: Vec<LineView>,
    #[serde(serialize_with = "serialize_decimal")]
    pub total_price: Money,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placed_at: Option<DateTime<Utc>>,
}

impl OrderView {
    pub(crate) fn new(order: &Order, lines: Vec<LineView>) -> Result<Self, OrderError> {
        let total_price = if order.status().is_placed() {
            order.total_price()
        } else {
            Money::checked_sum(lines.iter().map(|l| l.line_total))
                .ok_or(OrderError::TotalOverflow)?
        };

        Ok(Self {
            id: order.order_id(),
            principal_id: order.principal_id(),
            principal_name: None,
            status: order.status(),
            status_label: order.status().label(),
            lines,
            total_price,
            created_at: order.created_at(),
            placed_at: order.placed_at(),
        })
    }

    pub(crate) fn with_principal_name(mut self, name: String) -> Self {
        self.principal_name = Some(name);
        self
    }
}
