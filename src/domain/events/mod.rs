//! Domain events
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DomainEvent {
    Product(ProductEvent),
    Bundle(BundleEvent),
    Cart(CartEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: Uuid, seller: Uuid },
    Updated { product_id: Uuid },
    Deleted { product_id: Uuid },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BundleEvent {
    Created { bundle_id: Uuid, seller: Uuid, discounted_price: Decimal },
    Updated { bundle_id: Uuid },
    Repriced { bundle_id: Uuid, discounted_price: Decimal },
    Deleted { bundle_id: Uuid },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CartEvent {
    Changed { user: Uuid, items: usize },
    Cleared { user: Uuid },
}

impl DomainEvent {
    /// NATS subject, e.g. `marketplace.bundle.repriced`.
    pub fn subject(&self) -> String {
        let (entity, action) = match self {
            Self::Product(e) => ("product", match e {
                ProductEvent::Created { .. } => "created",
                ProductEvent::Updated { .. } => "updated",
                ProductEvent::Deleted { .. } => "deleted",
            }),
            Self::Bundle(e) => ("bundle", match e {
                BundleEvent::Created { .. } => "created",
                BundleEvent::Updated { .. } => "updated",
                BundleEvent::Repriced { .. } => "repriced",
                BundleEvent::Deleted { .. } => "deleted",
            }),
            Self::Cart(e) => ("cart", match e {
                CartEvent::Changed { .. } => "changed",
                CartEvent::Cleared { .. } => "cleared",
            }),
        };
        format!("marketplace.{entity}.{action}")
    }
}
