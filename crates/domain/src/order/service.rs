//! Cart service: the per-principal open order and its placement.

use std::sync::Arc;

use common::{OrderId, PizzaId, Principal, PrincipalId};
use metrics::{counter, histogram};
use store::{DocumentStore, OwnerFilter};

use crate::catalog::Catalog;
use crate::command::CommandHandler;
use crate::error::DomainError;
use crate::locks::PrincipalLocks;
use crate::pricing::line_total;

use super::{LineSnapshot, LineView, Order, OrderError, OrderView, open_cart_key};

const COLLECTION: &str = "orders";

/// Service managing each principal's open cart and placed orders.
///
/// Every mutation of a principal's cart runs under that principal's lock, and
/// the store's unique key keeps a second open cart from ever being written.
pub struct CartService<S: DocumentStore> {
    orders: CommandHandler<S, Order>,
    catalog: Arc<Catalog<S>>,
    locks: PrincipalLocks,
}

impl<S: DocumentStore> CartService<S> {
    /// Creates the service over `store`, pricing lines through `catalog`.
    pub fn new(store: S, catalog: Arc<Catalog<S>>) -> Self {
        Self {
            orders: CommandHandler::new(store, COLLECTION),
            catalog,
            locks: PrincipalLocks::new(),
        }
    }

    /// Returns the principal's open cart, if any.
    pub async fn open_cart(&self, principal: &Principal) -> Result<Option<Order>, DomainError> {
        self.orders
            .load_by_unique_key(&open_cart_key(principal.id))
            .await
    }

    /// Appends a line to the principal's cart, opening the cart first if needed.
    #[tracing::instrument(skip(self, principal), fields(principal = %principal.id))]
    pub async fn add_line(
        &self,
        principal: &Principal,
        pizza_id: PizzaId,
        quantity: i64,
    ) -> Result<Order, DomainError> {
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q >= 1)
            .ok_or_else(|| {
                DomainError::Validation(format!("quantity must be at least 1, got {quantity}"))
            })?;
        let pizza = self.catalog.visible_pizza(principal, pizza_id).await?;
        line_total(pizza.price(), quantity).ok_or(OrderError::TotalOverflow)?;

        let _guard = self.locks.acquire(principal.id).await;
        let cart = match self.open_cart(principal).await? {
            Some(cart) => cart,
            None => self.open(principal.id).await?,
        };

        let result = self
            .orders
            .execute_on(cart, |order| order.add_line(pizza_id, quantity))
            .await?;

        counter!("cart_lines_added_total").increment(1);
        Ok(result.aggregate)
    }

    /// Overwrites the quantity of a line; zero or less removes it.
    #[tracing::instrument(skip(self, principal), fields(principal = %principal.id))]
    pub async fn set_line_quantity(
        &self,
        principal: &Principal,
        pizza_id: PizzaId,
        quantity: i64,
    ) -> Result<Order, DomainError> {
        let _guard = self.locks.acquire(principal.id).await;
        let cart = self
            .open_cart(principal)
            .await?
            .ok_or(OrderError::NoOpenOrder)?;

        let result = self
            .orders
            .execute_on(cart, |order| order.set_line_quantity(pizza_id, quantity))
            .await?;
        Ok(result.aggregate)
    }

    /// Removes the first line for `pizza_id`.
    #[tracing::instrument(skip(self, principal), fields(principal = %principal.id))]
    pub async fn remove_line(
        &self,
        principal: &Principal,
        pizza_id: PizzaId,
    ) -> Result<Order, DomainError> {
        let _guard = self.locks.acquire(principal.id).await;
        let cart = self
            .open_cart(principal)
            .await?
            .ok_or(OrderError::NoOpenOrder)?;

        let result = self
            .orders
            .execute_on(cart, |order| order.remove_line(pizza_id))
            .await?;
        Ok(result.aggregate)
    }

    /// Finalizes the open cart: prices every line at its pizza's current
    /// price, stamps the total and sends the order to the kitchen.
    #[tracing::instrument(skip(self, principal), fields(principal = %principal.id))]
    pub async fn place(&self, principal: &Principal) -> Result<Order, DomainError> {
        let _guard = self.locks.acquire(principal.id).await;
        let cart = self
            .open_cart(principal)
            .await?
            .filter(Order::has_lines)
            .ok_or(OrderError::EmptyCart)?;

        let snapshots = self.snapshots(&cart).await?;
        let result = self
            .orders
            .execute_on(cart, |order| order.place(snapshots))
            .await?;

        record_placed(&result.aggregate);
        Ok(result.aggregate)
    }

    /// All orders of the principal, newest first.
    #[tracing::instrument(skip(self, principal), fields(principal = %principal.id))]
    pub async fn list_for_principal(&self, principal: &Principal) -> Result<Vec<Order>, DomainError> {
        let owner = principal.id.as_uuid();
        self.orders
            .query(|q| q.owner(OwnerFilter::Is(owner)).newest_first())
            .await
    }

    /// Looks up one of the principal's orders.
    ///
    /// Another principal's order is reported as missing.
    pub async fn get_by_id(
        &self,
        principal: &Principal,
        order_id: OrderId,
    ) -> Result<Order, DomainError> {
        match self.orders.load(order_id).await? {
            Some(order) if order.principal_id() == principal.id => Ok(order),
            _ => Err(DomainError::not_found("Order", order_id)),
        }
    }

    /// Resolves an order's lines for display.
    pub async fn view(&self, order: &Order) -> Result<OrderView, DomainError> {
        let mut lines = Vec::with_capacity(order.lines().len());
        for line in order.lines() {
            let view = match &line.snapshot {
                Some(snapshot) => LineView::priced(
                    line.pizza_id,
                    snapshot.title.clone(),
                    snapshot.unit_price,
                    line.quantity,
                )?,
                None => match self.catalog.get(line.pizza_id).await? {
                    Some(pizza) => LineView::priced(
                        line.pizza_id,
                        pizza.title().to_string(),
                        pizza.price(),
                        line.quantity,
                    )?,
                    None => LineView::unavailable(line.pizza_id, line.quantity),
                },
            };
            lines.push(view);
        }
        Ok(OrderView::new(order, lines)?)
    }

    /// Resolves a list of orders.
    pub async fn views(&self, orders: &[Order]) -> Result<Vec<OrderView>, DomainError> {
        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            views.push(self.view(order).await?);
        }
        Ok(views)
    }

    pub(crate) fn orders(&self) -> &CommandHandler<S, Order> {
        &self.orders
    }

    pub(crate) fn locks(&self) -> &PrincipalLocks {
        &self.locks
    }

    /// Captures each line's current pizza title and price.
    ///
    /// Fails with `InvalidTarget` if a line's pizza was deleted.
    pub(crate) async fn snapshots(&self, order: &Order) -> Result<Vec<LineSnapshot>, DomainError> {
        let mut snapshots = Vec::with_capacity(order.lines().len());
        for line in order.lines() {
            let pizza = self.catalog.get(line.pizza_id).await?.ok_or_else(|| {
                DomainError::InvalidTarget(format!("pizza {} no longer exists", line.pizza_id))
            })?;
            snapshots.push(LineSnapshot {
                title: pizza.title().to_string(),
                unit_price: pizza.price(),
            });
        }
        Ok(snapshots)
    }

    /// Opens a cart for a principal whose lock the caller holds.
    ///
    /// If another process won the race for the open-cart key, its cart is used.
    async fn open(&self, principal_id: PrincipalId) -> Result<Order, DomainError> {
        let order_id = OrderId::new();
        match self
            .orders
            .create(|order| order.open(order_id, principal_id))
            .await
        {
            Ok(result) => {
                tracing::info!(order = %order_id, "cart opened");
                Ok(result.aggregate)
            }
            Err(e) if e.is_conflict() => {
                tracing::debug!("open cart created concurrently; reloading");
                self.orders
                    .load_by_unique_key(&open_cart_key(principal_id))
                    .await?
                    .ok_or_else(|| OrderError::NoOpenOrder.into())
            }
            Err(e) => Err(e),
        }
    }
}

pub(crate) fn record_placed(order: &Order) {
    counter!("orders_placed_total").increment(1);
    histogram!("order_place_amount_minor").record(order.total_price().cents() as f64);
    tracing::info!(
        order = %order.order_id(),
        total = %order.total_price(),
        lines = order.lines().len(),
        "order placed"
    );
}
