//! Administrator view over every order and the status pipeline.

use std::sync::Arc;

use common::{OrderId, Principal};
use metrics::counter;
use store::DocumentStore;

use crate::access::require_admin;
use crate::directory::PrincipalDirectory;
use crate::error::DomainError;

use super::service::record_placed;
use super::{CartService, Order, OrderStatus, OrderView, StatusPolicy};

/// Lists all orders and moves them through the delivery pipeline.
pub struct OrderLedger<S: DocumentStore> {
    cart: Arc<CartService<S>>,
    directory: Arc<PrincipalDirectory<S>>,
    policy: StatusPolicy,
}

impl<S: DocumentStore> OrderLedger<S> {
    pub fn new(
        cart: Arc<CartService<S>>,
        directory: Arc<PrincipalDirectory<S>>,
        policy: StatusPolicy,
    ) -> Self {
        Self {
            cart,
            directory,
            policy,
        }
    }

    pub fn policy(&self) -> StatusPolicy {
        self.policy
    }

    /// Every order across all principals, newest first, with the principal's
    /// display name and each line's title resolved.
    #[tracing::instrument(skip(self, principal), fields(principal = %principal.id))]
    pub async fn list_all(&self, principal: &Principal) -> Result<Vec<OrderView>, DomainError> {
        require_admin(principal, "list all orders")?;

        let orders = self.cart.orders().query(|q| q.newest_first()).await?;
        let mut views = Vec::with_capacity(orders.len());
        for order in &orders {
            let name = self.directory.display_name(order.principal_id()).await?;
            views.push(self.cart.view(order).await?.with_principal_name(name));
        }
        Ok(views)
    }

    /// Moves an order to `target`.
    ///
    /// An order still in `Received` is finalized on the way out exactly as if
    /// its owner had placed it.
    #[tracing::instrument(skip(self, principal), fields(principal = %principal.id))]
    pub async fn advance_status(
        &self,
        principal: &Principal,
        order_id: OrderId,
        target: OrderStatus,
    ) -> Result<Order, DomainError> {
        require_admin(principal, "advance order status")?;

        let owner = self.cart.orders().load_existing(order_id).await?.principal_id();
        let _guard = self.cart.locks().acquire(owner).await;
        let order = self.cart.orders().load_existing(order_id).await?;
        let from = order.status();
        let policy = self.policy;

        let result = if from == OrderStatus::Received {
            let snapshots = self.cart.snapshots(&order).await?;
            let result = self
                .cart
                .orders()
                .execute_on(order, |o| o.place_and_advance(snapshots, target, policy))
                .await?;
            record_placed(&result.aggregate);
            result
        } else {
            self.cart
                .orders()
                .execute_on(order, |o| o.advance(target, policy))
                .await?
        };

        counter!("order_status_transitions_total", "to" => target.as_str()).increment(1);
        tracing::info!(order = %order_id, %from, to = %target, "order status advanced");
        Ok(result.aggregate)
    }
}
