//! Product Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::domain::pricing::{round_price, MAX_AMOUNT};
use crate::{MarketError, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub on_sale: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<Decimal>,
    pub seller: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a product creation request.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name and price are required."))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(required(message = "Name and price are required."), custom = "positive_amount")]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub on_sale: bool,
    #[validate(custom = "positive_amount")]
    pub sale_price: Option<Decimal>,
}

/// Partial update; absent fields are left untouched.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductChanges {
    #[validate(length(min = 1, message = "Name must not be empty."))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom = "positive_amount")]
    pub price: Option<Decimal>,
    pub on_sale: Option<bool>,
    #[validate(custom = "positive_amount")]
    pub sale_price: Option<Decimal>,
}

/// Amounts are kept in cents; they must stay above zero and within `MAX_AMOUNT` once rounded.
pub(crate) fn positive_amount(value: &Decimal) -> std::result::Result<(), ValidationError> {
    let rounded = round_price(*value);
    if rounded <= Decimal::ZERO {
        let mut err = ValidationError::new("positive");
        err.message = Some("Amounts must be greater than zero.".into());
        return Err(err);
    }
    if rounded > MAX_AMOUNT {
        let mut err = ValidationError::new("range");
        err.message = Some(format!("Amounts must not exceed {MAX_AMOUNT}.").into());
        return Err(err);
    }
    Ok(())
}

impl Product {
    pub fn create(seller: Uuid, input: NewProduct) -> Result<Self> {
        input.validate()?;
        let price = input
            .price
            .ok_or_else(|| MarketError::validation("Name and price are required."))?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            description: input.description,
            price: round_price(price),
            on_sale: input.on_sale,
            sale_price: if input.on_sale { input.sale_price.map(round_price) } else { None },
            seller,
            created_at: now,
            updated_at: now,
        })
    }

    /// Sale price when the product is on sale and one is set, base price otherwise.
    pub fn effective_price(&self) -> Decimal {
        match (self.on_sale, self.sale_price) {
            (true, Some(sale)) => sale,
            _ => self.price,
        }
    }

    pub fn is_owned_by(&self, user: Uuid) -> bool { self.seller == user }

    pub fn apply(&mut self, changes: ProductChanges) -> Result<()> {
        changes.validate()?;
        if let Some(name) = changes.name { self.name = name.trim().to_string(); }
        if let Some(description) = changes.description { self.description = description; }
        if let Some(price) = changes.price { self.price = round_price(price); }
        if let Some(on_sale) = changes.on_sale { self.on_sale = on_sale; }
        if !self.on_sale {
            self.sale_price = None;
        } else if let Some(sale) = changes.sale_price {
            self.sale_price = Some(round_price(sale));
        }
        self.touch();
        Ok(())
    }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}
