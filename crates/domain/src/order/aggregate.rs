//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{OrderId, PizzaId, PrincipalId};
use serde::{Deserialize, Serialize};
use store::Version;
use uuid::Uuid;

use crate::aggregate::Aggregate;
use crate::money::Money;
use crate::pricing::order_total;

use super::{
    OrderError, OrderEvent, OrderStatus, StatusPolicy,
    events::{
        LineAddedData, LineQuantityChangedData, LineRemovedData, OrderOpenedData,
        OrderPlacedData, StatusAdvancedData,
    },
};

/// Title and unit price captured when an order is placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSnapshot {
    pub title: String,
    pub unit_price: Money,
}

/// A `(pizza, quantity)` entry. Persisted lines always have quantity ≥ 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub pizza_id: PizzaId,
    pub quantity: u32,

    /// Frozen catalog values; present once the order is placed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<LineSnapshot>,
}

/// Key held by a principal's open cart in the order collection.
pub fn open_cart_key(principal: PrincipalId) -> String {
    format!("open-cart:{principal}")
}

/// Order aggregate root: the open cart while `Received`, a frozen placed
/// order afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Order {
    id: Option<OrderId>,

    #[serde(skip)]
    version: Version,

    principal_id: PrincipalId,
    status: OrderStatus,
    lines: Vec<LineItem>,
    total_price: Money,
    created_at: DateTime<Utc>,
    placed_at: Option<DateTime<Utc>>,
}

impl Aggregate for Order {
    type Event = OrderEvent;
    type Error = OrderError;
    type Id = OrderId;

    fn aggregate_type() -> &'static str {
        "Order"
    }

    fn id(&self) -> Option<OrderId> {
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

    fn owner(&self) -> Option<Uuid> {
        Some(self.principal_id.as_uuid())
    }

    fn status_tag(&self) -> Option<String> {
        Some(self.status.as_str().to_string())
    }

    fn unique_key(&self) -> Option<String> {
        (self.status == OrderStatus::Received).then(|| open_cart_key(self.principal_id))
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            OrderEvent::OrderOpened(data) => {
                self.id = Some(data.order_id);
                self.principal_id = data.principal_id;
                self.status = OrderStatus::Received;
                self.created_at = data.created_at;
            }
            OrderEvent::LineAdded(data) => self.lines.push(LineItem {
                pizza_id: data.pizza_id,
                quantity: data.quantity,
                snapshot: None,
            }),
            OrderEvent::LineQuantityChanged(data) => {
                if let Some(line) = self.line_mut(data.pizza_id) {
                    line.quantity = data.quantity;
                }
            }
            OrderEvent::LineRemoved(data) => {
                if let Some(index) = self.line_index(data.pizza_id) {
                    self.lines.remove(index);
                }
            }
            OrderEvent::OrderPlaced(data) => {
                for (line, snapshot) in self.lines.iter_mut().zip(data.snapshots) {
                    line.snapshot = Some(snapshot);
                }
                self.total_price = data.total_price;
                self.placed_at = Some(data.placed_at);
                self.status = OrderStatus::InKitchen;
            }
            OrderEvent::StatusAdvanced(data) => self.status = data.to,
        }
    }
}

// Query methods
impl Order {
    /// Returns the identifier.
    ///
    /// Orders loaded from the store always carry one.
    pub fn order_id(&self) -> OrderId {
        self.id.unwrap_or_default()
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Stamped total; zero while the order is still the open cart.
    pub fn total_price(&self) -> Money {
        self.total_price
    }

    pub fn placed_at(&self) -> Option<DateTime<Utc>> {
        self.placed_at
    }

    /// Returns true if the order has lines.
    pub fn has_lines(&self) -> bool {
        !self.lines.is_empty()
    }

    fn line_index(&self, pizza_id: PizzaId) -> Option<usize> {
        self.lines.iter().position(|l| l.pizza_id == pizza_id)
    }

    fn line_mut(&mut self, pizza_id: PizzaId) -> Option<&mut LineItem> {
        self.lines.iter_mut().find(|l| l.pizza_id == pizza_id)
    }

    fn ensure_modifiable(&self) -> Result<(), OrderError> {
        if self.status.can_modify_lines() {
            Ok(())
        } else {
            Err(OrderError::NotModifiable {
                status: self.status,
            })
        }
    }
}

// Command methods (return events)
impl Order {
    /// Opens an empty cart for a principal.
    pub fn open(
        &self,
        order_id: OrderId,
        principal_id: PrincipalId,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.id.is_some() {
            return Err(OrderError::AlreadyCreated);
        }

        Ok(vec![OrderEvent::OrderOpened(OrderOpenedData {
            order_id,
            principal_id,
            created_at: Utc::now(),
        })])
    }

    /// Appends a line. Repeated adds of the same pizza produce separate lines.
    pub fn add_line(&self, pizza_id: PizzaId, quantity: u32) -> Result<Vec<OrderEvent>, OrderError> {
        self.ensure_modifiable()?;

        if quantity == 0 {
            return Err(OrderError::InvalidQuantity {
                quantity: quantity.into(),
            });
        }

        Ok(vec![OrderEvent::LineAdded(LineAddedData { pizza_id, quantity })])
    }

    /// Overwrites the quantity of the first line for `pizza_id`.
    ///
    /// A quantity of zero or less removes the line instead.
    pub fn set_line_quantity(
        &self,
        pizza_id: PizzaId,
        quantity: i64,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        self.ensure_modifiable()?;

        let line = self
            .lines
            .iter()
            .find(|l| l.pizza_id == pizza_id)
            .ok_or_else(|| OrderError::LineNotFound {
                pizza_id: pizza_id.to_string(),
            })?;

        if quantity <= 0 {
            return Ok(vec![OrderEvent::LineRemoved(LineRemovedData { pizza_id })]);
        }

        let quantity = u32::try_from(quantity).map_err(|_| OrderError::InvalidQuantity { quantity })?;
        if quantity == line.quantity {
            return Ok(vec![]);
        }

        Ok(vec![OrderEvent::LineQuantityChanged(LineQuantityChangedData {
            pizza_id,
            previous: line.quantity,
            quantity,
        })])
    }

    /// Removes the first line for `pizza_id`.
    pub fn remove_line(&self, pizza_id: PizzaId) -> Result<Vec<OrderEvent>, OrderError> {
        self.ensure_modifiable()?;

        if self.line_index(pizza_id).is_none() {
            return Err(OrderError::LineNotFound {
                pizza_id: pizza_id.to_string(),
            });
        }

        Ok(vec![OrderEvent::LineRemoved(LineRemovedData { pizza_id })])
    }

    /// Stamps the total, freezes the lines and sends the order to the kitchen.
    ///
    /// `snapshots` carries the current title and unit price of each line, in
    /// line order.
    pub fn place(&self, snapshots: Vec<LineSnapshot>) -> Result<Vec<OrderEvent>, OrderError> {
        self.ensure_modifiable()?;

        if !self.has_lines() {
            return Err(OrderError::EmptyCart);
        }

        if snapshots.len() != self.lines.len() {
            return Err(OrderError::PricingMismatch {
                lines: self.lines.len(),
                priced: snapshots.len(),
            });
        }

        let total_price = order_total(
            self.lines
                .iter()
                .zip(&snapshots)
                .map(|(line, snapshot)| (snapshot.unit_price, line.quantity)),
        )
        .ok_or(OrderError::TotalOverflow)?;

        Ok(vec![OrderEvent::OrderPlaced(OrderPlacedData {
            snapshots,
            total_price,
            placed_at: Utc::now(),
        })])
    }

    /// Moves a placed order to `target` under `policy`.
    pub fn advance(
        &self,
        target: OrderStatus,
        policy: StatusPolicy,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if !self.status.is_placed() || !policy.permits(self.status, target) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }

        Ok(vec![OrderEvent::StatusAdvanced(StatusAdvancedData {
            from: self.status,
            to: target,
            changed_at: Utc::now(),
        })])
    }

    /// Places a still-open order on an administrator's behalf and moves it
    /// on to `target` when that lies beyond the kitchen.
    pub fn place_and_advance(
        &self,
        snapshots: Vec<LineSnapshot>,
        target: OrderStatus,
        policy: StatusPolicy,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if !policy.permits(self.status, target) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }

        let mut events = self.place(snapshots)?;
        if target != OrderStatus::InKitchen {
            let mut placed = self.clone();
            placed.apply_events(events.iter().cloned());
            events.extend(placed.advance(target, policy)?);
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::DomainEvent;

    fn open() -> Order {
        let mut order = Order::default();
        let events = order.open(OrderId::new(), PrincipalId::new()).unwrap();
        order.apply_events(events);
        order
    }

    fn with_lines(lines: &[(PizzaId, u32)]) -> Order {
        let mut order = open();
        for (pizza_id, quantity) in lines {
            let events = order.add_line(*pizza_id, *quantity).unwrap();
            order.apply_events(events);
        }
        order
    }

    fn snapshot(title: &str, cents: i64) -> LineSnapshot {
        LineSnapshot {
            title: title.to_string(),
            unit_price: Money::from_cents(cents),
        }
    }

    #[test]
    fn test_open_cart() {
        let order = open();
        assert!(order.id().is_some());
        assert_eq!(order.status(), OrderStatus::Received);
        assert!(!order.has_lines());
        assert_eq!(order.total_price(), Money::zero());
        assert_eq!(
            order.unique_key(),
            Some(open_cart_key(order.principal_id()))
        );
    }

    #[test]
    fn test_open_twice_fails() {
        let order = open();
        let result = order.open(OrderId::new(), PrincipalId::new());
        assert!(matches!(result, Err(OrderError::AlreadyCreated)));
    }

    #[test]
    fn test_duplicate_adds_are_separate_lines() {
        let pizza = PizzaId::new();
        let order = with_lines(&[(pizza, 1), (pizza, 2)]);
        assert_eq!(order.lines().len(), 2);
        assert_eq!(order.lines()[1].quantity, 2);
    }

    #[test]
    fn test_add_zero_quantity_fails() {
        let order = open();
        let result = order.add_line(PizzaId::new(), 0);
        assert!(matches!(result, Err(OrderError::InvalidQuantity { quantity: 0 })));
    }

    #[test]
    fn test_set_quantity_targets_first_line() {
        let pizza = PizzaId::new();
        let mut order = with_lines(&[(pizza, 1), (pizza, 2)]);

        let events = order.set_line_quantity(pizza, 5).unwrap();
        order.apply_events(events);

        assert_eq!(order.lines()[0].quantity, 5);
        assert_eq!(order.lines()[1].quantity, 2);
    }

    #[test]
    fn test_set_quantity_zero_or_less_removes_line() {
        let pizza = PizzaId::new();
        for quantity in [0, -3] {
            let mut order = with_lines(&[(pizza, 1)]);
            let events = order.set_line_quantity(pizza, quantity).unwrap();
            assert_eq!(events[0].event_type(), "LineRemoved");
            order.apply_events(events);
            assert!(!order.has_lines());
        }
    }

    #[test]
    fn test_set_same_quantity_is_noop() {
        let pizza = PizzaId::new();
        let order = with_lines(&[(pizza, 3)]);
        assert!(order.set_line_quantity(pizza, 3).unwrap().is_empty());
    }

    #[test]
    fn test_set_quantity_unknown_line() {
        let order = with_lines(&[(PizzaId::new(), 1)]);
        let result = order.set_line_quantity(PizzaId::new(), 2);
        assert!(matches!(result, Err(OrderError::LineNotFound { .. })));
    }

    #[test]
    fn test_remove_line() {
        let keep = PizzaId::new();
        let drop = PizzaId::new();
        let mut order = with_lines(&[(keep, 1), (drop, 1)]);

        let events = order.remove_line(drop).unwrap();
        order.apply_events(events);

        assert_eq!(order.lines().len(), 1);
        assert_eq!(order.lines()[0].pizza_id, keep);
        assert!(order.remove_line(drop).is_err());
    }

    #[test]
    fn test_place_computes_total_and_freezes() {
        let a = PizzaId::new();
        let b = PizzaId::new();
        let mut order = with_lines(&[(a, 2), (b, 1)]);

        let events = order
            .place(vec![snapshot("A", 200), snapshot("B", 150)])
            .unwrap();
        order.apply_events(events);

        assert_eq!(order.total_price().cents(), 550);
        assert_eq!(order.status(), OrderStatus::InKitchen);
        assert!(order.placed_at().is_some());
        assert_eq!(order.unique_key(), None);
        assert_eq!(
            order.lines()[0].snapshot.as_ref().map(|s| s.title.as_str()),
            Some("A")
        );

        let result = order.add_line(a, 1);
        assert!(matches!(result, Err(OrderError::NotModifiable { .. })));
    }

    #[test]
    fn test_place_empty_cart_fails() {
        let order = open();
        assert!(matches!(order.place(vec![]), Err(OrderError::EmptyCart)));
    }

    #[test]
    fn test_place_rejects_overflowing_total() {
        let order = with_lines(&[(PizzaId::new(), 2)]);
        let result = order.place(vec![snapshot("Gold Leaf", i64::MAX)]);
        assert!(matches!(result, Err(OrderError::TotalOverflow)));

        let order = with_lines(&[(PizzaId::new(), 1), (PizzaId::new(), 1)]);
        let result = order.place(vec![snapshot("A", i64::MAX), snapshot("B", 1)]);
        assert!(matches!(result, Err(OrderError::TotalOverflow)));

        let order = with_lines(&[(PizzaId::new(), u32::MAX)]);
        let events = order.place(vec![snapshot("Bulk", 100)]).unwrap();
        assert!(matches!(
            events.as_slice(),
            [OrderEvent::OrderPlaced(data)] if data.total_price.cents() == 100 * i64::from(u32::MAX)
        ));
    }

    #[test]
    fn test_place_requires_a_snapshot_per_line() {
        let order = with_lines(&[(PizzaId::new(), 1)]);
        let result = order.place(vec![]);
        assert!(matches!(result, Err(OrderError::PricingMismatch { .. })));
    }

    #[test]
    fn test_advance_through_pipeline() {
        let mut order = with_lines(&[(PizzaId::new(), 1)]);
        order.apply_events(order.place(vec![snapshot("A", 100)]).unwrap());

        for target in [OrderStatus::OutForDelivery, OrderStatus::Delivered] {
            let events = order.advance(target, StatusPolicy::Sequential).unwrap();
            order.apply_events(events);
            assert_eq!(order.status(), target);
        }

        let result = order.advance(OrderStatus::Delivered, StatusPolicy::Unrestricted);
        assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));
    }

    #[test]
    fn test_advance_rejects_open_cart() {
        let order = with_lines(&[(PizzaId::new(), 1)]);
        let result = order.advance(OrderStatus::InKitchen, StatusPolicy::Sequential);
        assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));
    }

    #[test]
    fn test_place_and_advance() {
        let order = with_lines(&[(PizzaId::new(), 2)]);

        let events = order
            .place_and_advance(
                vec![snapshot("A", 100)],
                OrderStatus::InKitchen,
                StatusPolicy::Sequential,
            )
            .unwrap();
        assert_eq!(events.len(), 1);

        let mut jumped = order.clone();
        let events = order
            .place_and_advance(
                vec![snapshot("A", 100)],
                OrderStatus::Delivered,
                StatusPolicy::Unrestricted,
            )
            .unwrap();
        jumped.apply_events(events);
        assert_eq!(jumped.status(), OrderStatus::Delivered);
        assert_eq!(jumped.total_price().cents(), 200);

        let result = order.place_and_advance(
            vec![snapshot("A", 100)],
            OrderStatus::Delivered,
            StatusPolicy::Sequential,
        );
        assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));
    }

    #[test]
    fn test_index_attributes() {
        let order = open();
        assert_eq!(order.owner(), Some(order.principal_id().as_uuid()));
        assert_eq!(order.status_tag().as_deref(), Some("Received"));
    }
}
