//! Cart Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::aggregates::{Bundle, Product};
use crate::domain::pricing::{out_of_range, round_price};
use crate::{MarketError, Result};

pub const INVALID_ITEM: &str = "Invalid item data.";
pub const ITEM_NOT_IN_CART: &str = "Item not found in cart.";

/// Largest quantity a single line may hold.
pub const MAX_LINE_QUANTITY: u32 = 10_000;

/// What a line item points at. Serialized as `{"type": "product", "product": id}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemRef {
    Product { product: Uuid },
    Bundle { bundle: Uuid },
}

impl ItemRef {
    pub fn product(id: Uuid) -> Self { Self::Product { product: id } }
    pub fn bundle(id: Uuid) -> Self { Self::Bundle { bundle: id } }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Product { .. } => "product",
            Self::Bundle { .. } => "bundle",
        }
    }

    pub fn target(&self) -> Uuid {
        match self {
            Self::Product { product } => *product,
            Self::Bundle { bundle } => *bundle,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub item: ItemRef,
    pub quantity: u32,
}

/// Loosely typed line item as clients send it; see [`ItemRequest::item_ref`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl ItemRequest {
    pub fn new(item: ItemRef, quantity: Option<u32>) -> Self {
        let (product, bundle) = match item {
            ItemRef::Product { product } => (Some(product), None),
            ItemRef::Bundle { bundle } => (None, Some(bundle)),
        };
        Self { kind: Some(item.kind().to_string()), product, bundle, quantity }
    }

    /// The kind must be `product` or `bundle` and carry the matching reference.
    pub fn item_ref(&self) -> Result<ItemRef> {
        match (self.kind.as_deref(), self.product, self.bundle) {
            (Some("product"), Some(id), _) => Ok(ItemRef::product(id)),
            (Some("bundle"), _, Some(id)) => Ok(ItemRef::bundle(id)),
            _ => Err(MarketError::validation(INVALID_ITEM)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cart {
    id: Uuid,
    user: Uuid,
    items: Vec<CartItem>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn for_user(user: Uuid) -> Self {
        let now = Utc::now();
        Self { id: Uuid::now_v7(), user, items: vec![], created_at: now, updated_at: now }
    }

    /// Rebuilds a cart loaded from storage.
    pub fn restore(id: Uuid, user: Uuid, items: Vec<CartItem>, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        Self { id, user, items, created_at, updated_at }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn user(&self) -> Uuid { self.user }
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    /// Adds `quantity` of `item`, merging into an existing line for the same target.
    pub fn add_item(&mut self, item: ItemRef, quantity: u32) -> Result<()> {
        ensure_quantity(quantity)?;
        if let Some(existing) = self.items.iter_mut().find(|i| i.item == item) {
            let merged = existing.quantity.saturating_add(quantity);
            ensure_quantity(merged)?;
            existing.quantity = merged;
        } else {
            self.items.push(CartItem { item, quantity });
        }
        self.touch();
        Ok(())
    }

    pub fn update_quantity(&mut self, item: ItemRef, quantity: u32) -> Result<()> {
        ensure_quantity(quantity)?;
        let line = self
            .items
            .iter_mut()
            .find(|i| i.item == item)
            .ok_or_else(|| MarketError::not_found(ITEM_NOT_IN_CART))?;
        line.quantity = quantity;
        self.touch();
        Ok(())
    }

    /// Returns whether a line was removed. Removing an absent item is not an error.
    pub fn remove_item(&mut self, item: ItemRef) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.item != item);
        self.touch();
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.touch();
    }

    /// Product and bundle ids referenced by the cart, in line order.
    pub fn referenced(&self) -> (Vec<Uuid>, Vec<Uuid>) {
        let mut products = vec![];
        let mut bundles = vec![];
        for line in &self.items {
            match line.item {
                ItemRef::Product { product } => products.push(product),
                ItemRef::Bundle { bundle } => bundles.push(bundle),
            }
        }
        (products, bundles)
    }

    /// Attaches product/bundle details to every line. References that no
    /// longer resolve hydrate to `None` and do not count towards the subtotal.
    pub fn hydrate(&self, products: &[Product], bundles: &[Bundle]) -> Result<CartView> {
        let mut subtotal = Decimal::ZERO;
        let mut items = Vec::with_capacity(self.items.len());
        for line in &self.items {
            let (detail, price) = match line.item {
                ItemRef::Product { product } => {
                    let found = products.iter().find(|p| p.id == product).cloned();
                    let price = found.as_ref().map(Product::effective_price);
                    (LineDetail::Product { product: found }, price)
                }
                ItemRef::Bundle { bundle } => {
                    let found = bundles.iter().find(|b| b.id == bundle).cloned();
                    let price = found.as_ref().map(|b| b.discounted_price);
                    (LineDetail::Bundle { bundle: found }, price)
                }
            };
            if let Some(price) = price {
                let amount = price.checked_mul(Decimal::from(line.quantity)).ok_or_else(out_of_range)?;
                subtotal = subtotal.checked_add(amount).ok_or_else(out_of_range)?;
            }
            items.push(CartLine { detail, quantity: line.quantity });
        }
        Ok(CartView {
            id: self.id,
            user: self.user,
            items,
            subtotal: round_price(subtotal),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

fn ensure_quantity(quantity: u32) -> Result<()> {
    if quantity == 0 {
        return Err(MarketError::validation("Quantity must be at least 1."));
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(MarketError::validation(format!("Quantity must not exceed {MAX_LINE_QUANTITY}.")));
    }
    Ok(())
}

/// Cart as returned to clients, with referenced entities attached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub id: Uuid,
    pub user: Uuid,
    pub items: Vec<CartLine>,
    pub subtotal: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub detail: LineDetail,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LineDetail {
    Product { product: Option<Product> },
    Bundle { bundle: Option<Bundle> },
}
