//! Bundle Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::aggregates::Product;
use crate::domain::pricing::{self, MIN_BUNDLE_PRODUCTS, TOO_FEW_PRODUCTS};
use crate::{MarketError, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub id: Uuid,
    pub name: String,
    pub products: Vec<Uuid>,
    pub seller: Uuid,
    pub discounted_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Bundle with its member products resolved, as returned by listings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleView {
    pub id: Uuid,
    pub name: String,
    pub products: Vec<Product>,
    pub seller: Uuid,
    pub discounted_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
pub struct NewBundle {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name and products array are required."))]
    pub name: String,
    #[validate(required(message = "Name and products array are required."))]
    pub products: Option<Vec<Uuid>>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
pub struct BundleChanges {
    #[validate(length(min = 1, message = "Name must not be empty."))]
    pub name: Option<String>,
    pub products: Option<Vec<Uuid>>,
}

/// Current price of a bundle recomputed from its members.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountCheck {
    pub discounted_price: Decimal,
    pub stored_price: Decimal,
    pub changed: bool,
}

/// Removes repeated ids, keeping first-seen order, and enforces the
/// two-distinct-products minimum on the request itself.
pub fn distinct_members(ids: &[Uuid]) -> Result<Vec<Uuid>> {
    let mut out: Vec<Uuid> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    if out.len() < MIN_BUNDLE_PRODUCTS {
        return Err(MarketError::validation(TOO_FEW_PRODUCTS));
    }
    Ok(out)
}

impl Bundle {
    /// Builds a bundle from already resolved member products.
    pub fn create(seller: Uuid, name: impl Into<String>, members: &[Product]) -> Result<Self> {
        let discounted_price = pricing::discounted_price(members)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::now_v7(),
            name: name.into().trim().to_string(),
            products: members.iter().map(|p| p.id).collect(),
            seller,
            discounted_price,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_owned_by(&self, user: Uuid) -> bool { self.seller == user }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into().trim().to_string();
        self.touch();
    }

    /// Replaces the member set and overwrites the cached price.
    pub fn reprice(&mut self, members: &[Product]) -> Result<()> {
        self.discounted_price = pricing::discounted_price(members)?;
        self.products = members.iter().map(|p| p.id).collect();
        self.touch();
        Ok(())
    }

    pub fn check(&self, members: &[Product]) -> Result<DiscountCheck> {
        let current = pricing::discounted_price(members)?;
        Ok(DiscountCheck {
            discounted_price: current,
            stored_price: self.discounted_price,
            changed: current != self.discounted_price,
        })
    }

    /// Attaches resolved members; ids that no longer resolve are left out.
    pub fn into_view(self, resolved: &[Product]) -> BundleView {
        let products = self
            .products
            .iter()
            .filter_map(|id| resolved.iter().find(|p| p.id == *id).cloned())
            .collect();
        BundleView {
            id: self.id,
            name: self.name,
            products,
            seller: self.seller,
            discounted_price: self.discounted_price,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}
