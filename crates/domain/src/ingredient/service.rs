//! Ingredient store service.

use common::{IngredientId, Principal};
use metrics::counter;
use store::DocumentStore;

use crate::access::require_admin;
use crate::command::CommandHandler;
use crate::error::DomainError;
use crate::money::Money;
use crate::notify::{AlertDispatcher, AlertMessage};

use super::{Ingredient, IngredientEvent, IngredientKind, NewIngredient};

/// Who receives low-stock alerts and who they come from.
#[derive(Debug, Clone)]
pub struct AlertSettings {
    pub recipients: Vec<String>,
    pub sender: String,
}

impl AlertSettings {
    /// Parses a comma-separated recipient list, dropping blanks.
    pub fn parse_recipients(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            recipients: Vec::new(),
            sender: "Pizza System".to_string(),
        }
    }
}

/// Service managing the four ingredient inventories.
///
/// Each kind has its own handler over its own collection; every lookup
/// goes through an exhaustive match on [`IngredientKind`].
pub struct IngredientStore<S: DocumentStore> {
    bases: CommandHandler<S, Ingredient>,
    sauces: CommandHandler<S, Ingredient>,
    cheeses: CommandHandler<S, Ingredient>,
    vegetables: CommandHandler<S, Ingredient>,
    alerts: AlertSettings,
    dispatcher: AlertDispatcher,
}

impl<S: DocumentStore + Clone> IngredientStore<S> {
    /// Creates the service over `store`.
    pub fn new(store: S, alerts: AlertSettings, dispatcher: AlertDispatcher) -> Self {
        let handler = |kind: IngredientKind| CommandHandler::new(store.clone(), kind.collection());

        Self {
            bases: handler(IngredientKind::Base),
            sauces: handler(IngredientKind::Sauce),
            cheeses: handler(IngredientKind::Cheese),
            vegetables: handler(IngredientKind::Vegetable),
            alerts,
            dispatcher,
        }
    }
}

impl<S: DocumentStore> IngredientStore<S> {
    fn handler(&self, kind: IngredientKind) -> &CommandHandler<S, Ingredient> {
        match kind {
            IngredientKind::Base => &self.bases,
            IngredientKind::Sauce => &self.sauces,
            IngredientKind::Cheese => &self.cheeses,
            IngredientKind::Vegetable => &self.vegetables,
        }
    }

    /// Returns the alert dispatcher (tests drain it to observe deliveries).
    pub fn dispatcher(&self) -> &AlertDispatcher {
        &self.dispatcher
    }

    /// Adds an ingredient. Names need not be unique.
    #[tracing::instrument(skip(self, principal), fields(principal = %principal.id))]
    pub async fn create(
        &self,
        principal: &Principal,
        input: NewIngredient,
    ) -> Result<Ingredient, DomainError> {
        require_admin(principal, "create ingredients")?;

        let ingredient_id = IngredientId::new();
        let result = self
            .handler(input.kind)
            .create(|ingredient| ingredient.create(ingredient_id, input))
            .await?;

        tracing::info!(ingredient = %ingredient_id, "ingredient created");
        Ok(result.aggregate)
    }

    /// Overwrites the stock level and alerts every recipient when it ends
    /// up below the threshold.
    ///
    /// Alerts are queued after the write commits; delivery failures never
    /// reach the caller.
    #[tracing::instrument(skip(self, principal), fields(principal = %principal.id))]
    pub async fn update_stock(
        &self,
        principal: &Principal,
        kind: IngredientKind,
        id: IngredientId,
        stock: u32,
    ) -> Result<Ingredient, DomainError> {
        require_admin(principal, "update ingredient stock")?;

        let result = self
            .handler(kind)
            .execute(id, |ingredient| ingredient.update_stock(stock))
            .await?;

        counter!("ingredient_stock_updates_total", "kind" => kind.as_str()).increment(1);

        for event in &result.events {
            if let IngredientEvent::StockFellBelowThreshold(data) = event {
                self.alert_low_stock(&result.aggregate, data.stock, data.threshold);
            }
        }

        Ok(result.aggregate)
    }

    /// Changes the unit price.
    #[tracing::instrument(skip(self, principal), fields(principal = %principal.id))]
    pub async fn update_price(
        &self,
        principal: &Principal,
        kind: IngredientKind,
        id: IngredientId,
        unit_price: Money,
    ) -> Result<Ingredient, DomainError> {
        require_admin(principal, "update ingredient price")?;

        let result = self
            .handler(kind)
            .execute(id, |ingredient| ingredient.update_price(unit_price))
            .await?;

        Ok(result.aggregate)
    }

    /// Hard-deletes an ingredient. Pizzas referencing it are left dangling.
    #[tracing::instrument(skip(self, principal), fields(principal = %principal.id))]
    pub async fn delete(
        &self,
        principal: &Principal,
        kind: IngredientKind,
        id: IngredientId,
    ) -> Result<(), DomainError> {
        require_admin(principal, "delete ingredients")?;

        if !self.handler(kind).delete(id).await? {
            return Err(DomainError::not_found("Ingredient", id));
        }

        tracing::info!(ingredient = %id, "ingredient deleted");
        Ok(())
    }

    /// Lists every ingredient of `kind` in insertion order.
    #[tracing::instrument(skip(self, principal), fields(principal = %principal.id))]
    pub async fn list(
        &self,
        principal: &Principal,
        kind: IngredientKind,
    ) -> Result<Vec<Ingredient>, DomainError> {
        require_admin(principal, "list ingredients")?;
        self.handler(kind).query(|q| q).await
    }

    /// Looks up one ingredient without a role check. Used for price and
    /// reference resolution.
    pub async fn get(
        &self,
        kind: IngredientKind,
        id: IngredientId,
    ) -> Result<Option<Ingredient>, DomainError> {
        self.handler(kind).load(id).await
    }

    fn alert_low_stock(&self, ingredient: &Ingredient, stock: u32, threshold: u32) {
        counter!("low_stock_alerts_total").increment(1);
        tracing::warn!(
            ingredient = ingredient.name(),
            stock,
            threshold,
            recipients = self.alerts.recipients.len(),
            "stock fell below threshold"
        );

        for recipient in &self.alerts.recipients {
            self.dispatcher.enqueue(AlertMessage::low_stock(
                &self.alerts.sender,
                recipient,
                ingredient.name(),
                stock,
                threshold,
            ));
        }
    }
}
