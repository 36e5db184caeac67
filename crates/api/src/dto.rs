//! Request and response bodies.
//!
//! Request bodies reject unknown fields. Numeric fields accept JSON numbers
//! or numeric strings; prices accept decimals (`"12.50"`, `12.5`) and are
//! converted to minor units before reaching the domain.

use std::collections::BTreeSet;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use chrono::{DateTime, Utc};
use common::{IngredientId, PizzaId};
use domain::money::serialize_decimal;
use domain::{Aggregate, Ingredient, IngredientKind, Money, NewIngredient, PizzaPatch, PizzaRecipe};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// JSON body extractor whose rejections use the API error shape.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| ApiError::BadRequest(e.body_text()))?;
        Ok(Self(value))
    }
}

// -- Coercion helpers --

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(serde_json::Number),
    Text(String),
}

impl NumberOrString {
    fn into_text(self) -> String {
        match self {
            NumberOrString::Number(n) => n.to_string(),
            NumberOrString::Text(s) => s.trim().to_string(),
        }
    }
}

fn integer<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = NumberOrString::deserialize(deserializer)?.into_text();
    raw.parse()
        .map_err(|e| de::Error::custom(format!("invalid integer {raw:?}: {e}")))
}

fn money<'de, D>(deserializer: D) -> Result<Money, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = NumberOrString::deserialize(deserializer)?.into_text();
    Money::parse_decimal(&raw).map_err(de::Error::custom)
}

fn optional_integer<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(value) => {
            let raw = value.into_text();
            raw.parse()
                .map(Some)
                .map_err(|e| de::Error::custom(format!("invalid integer {raw:?}: {e}")))
        }
        None => Ok(None),
    }
}

fn optional_money<'de, D>(deserializer: D) -> Result<Option<Money>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(value) => Money::parse_decimal(&value.into_text())
            .map(Some)
            .map_err(de::Error::custom),
        None => Ok(None),
    }
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field (`None`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn one() -> i64 {
    1
}

// -- Ingredient bodies --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateIngredientRequest {
    pub kind: IngredientKind,
    pub name: String,
    #[serde(deserialize_with = "integer")]
    pub stock: u32,
    #[serde(default, deserialize_with = "optional_integer")]
    pub threshold: Option<u32>,
    #[serde(deserialize_with = "money")]
    pub price: Money,
}

impl CreateIngredientRequest {
    pub fn into_input(self) -> NewIngredient {
        let input = NewIngredient::new(self.kind, self.name, self.stock, self.price);
        match self.threshold {
            Some(threshold) => input.with_threshold(threshold),
            None => input,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateStockRequest {
    #[serde(deserialize_with = "integer")]
    pub stock: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePriceRequest {
    #[serde(deserialize_with = "money")]
    pub price: Money,
}

#[derive(Debug, Serialize)]
pub struct IngredientResponse {
    pub id: IngredientId,
    pub kind: IngredientKind,
    pub name: String,
    pub stock: u32,
    pub threshold: u32,
    #[serde(serialize_with = "serialize_decimal")]
    pub unit_price: Money,
    pub below_threshold: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Ingredient> for IngredientResponse {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            id: ingredient.ingredient_id(),
            kind: ingredient.kind(),
            name: ingredient.name().to_string(),
            stock: ingredient.stock(),
            threshold: ingredient.threshold(),
            unit_price: ingredient.unit_price(),
            below_threshold: ingredient.is_below_threshold(),
            created_at: ingredient.created_at(),
        }
    }
}

// -- Pizza bodies --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PizzaRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub base: Option<IngredientId>,
    #[serde(default)]
    pub sauce: Option<IngredientId>,
    #[serde(default)]
    pub cheese: Option<IngredientId>,
    #[serde(default)]
    pub vegetables: BTreeSet<IngredientId>,
    #[serde(default, deserialize_with = "optional_money")]
    pub price: Option<Money>,
}

impl PizzaRequest {
    pub fn into_parts(self) -> (PizzaRecipe, Option<Money>) {
        let recipe = PizzaRecipe {
            title: self.title,
            description: self.description,
            base: self.base,
            sauce: self.sauce,
            cheese: self.cheese,
            vegetables: self.vegetables,
        };
        (recipe, self.price)
    }
}

/// Partial pizza update. Absent fields stay unchanged; `null` clears an
/// ingredient reference (or empties the vegetables).
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PizzaPatchRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub base: Option<Option<IngredientId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub sauce: Option<Option<IngredientId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub cheese: Option<Option<IngredientId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub vegetables: Option<Option<BTreeSet<IngredientId>>>,
    #[serde(default, deserialize_with = "optional_money")]
    pub price: Option<Money>,
}

impl From<PizzaPatchRequest> for PizzaPatch {
    fn from(req: PizzaPatchRequest) -> Self {
        PizzaPatch {
            title: req.title,
            description: req.description,
            base: req.base,
            sauce: req.sauce,
            cheese: req.cheese,
            vegetables: req.vegetables.map(Option::unwrap_or_default),
            price: req.price,
        }
    }
}

// -- Cart and order bodies --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddLineRequest {
    pub pizza_id: PizzaId,
    #[serde(default = "one", deserialize_with = "integer")]
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetQuantityRequest {
    pub pizza_id: PizzaId,
    #[serde(deserialize_with = "integer")]
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdvanceStatusRequest {
    /// A status name (`OutForDelivery`) or its label (`Sent to Delivery`).
    pub status: String,
}
