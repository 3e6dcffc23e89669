//! Bundles and bundle pricing.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{ensure_owner, ensure_seller, Caller};
use crate::domain::aggregates::bundle::distinct_members;
use crate::domain::aggregates::{Bundle, BundleChanges, BundleView, DiscountCheck, NewBundle, Product};
use crate::domain::events::{BundleEvent, DomainEvent};
use crate::domain::pricing;
use crate::domain::value_objects::{Page, PageRequest};
use crate::events::EventPublisher;
use crate::store::MarketStore;
use crate::{MarketError, Result};

pub const BUNDLE_NOT_FOUND: &str = "Bundle not found";

/// Price of a prospective member set together with the resolved products.
#[derive(Clone, Debug, PartialEq)]
pub struct BundleQuote {
    pub discounted_price: Decimal,
    pub products: Vec<Product>,
}

#[derive(Clone)]
pub struct BundleService {
    store: Arc<dyn MarketStore>,
    events: EventPublisher,
}

impl BundleService {
    pub fn new(store: Arc<dyn MarketStore>, events: EventPublisher) -> Self { Self { store, events } }

    /// Resolves `product_ids` and prices them. Read-only.
    ///
    /// Ids that name no product are left out; at least two distinct products
    /// must remain.
    #[instrument(skip(self))]
    pub async fn compute_discount(&self, product_ids: &[Uuid]) -> Result<BundleQuote> {
        let ids = distinct_members(product_ids)?;
        let found = self.store.find_products(&ids).await?;
        // keep request order
        let products: Vec<Product> = ids
            .iter()
            .filter_map(|id| found.iter().find(|p| p.id == *id).cloned())
            .collect();
        if products.len() < ids.len() {
            debug!(unknown = ids.len() - products.len(), "unknown products left out of bundle");
        }
        let discounted_price = pricing::discounted_price(&products)?;
        Ok(BundleQuote { discounted_price, products })
    }

    #[instrument(skip(self, caller, input), fields(seller = %caller.id))]
    pub async fn create(&self, caller: &Caller, input: NewBundle) -> Result<Bundle> {
        ensure_seller(caller)?;
        input.validate()?;
        let ids = input.products.unwrap_or_default();
        let quote = self.compute_discount(&ids).await?;
        let bundle = Bundle::create(caller.id, input.name, &quote.products)?;
        self.store.insert_bundle(&bundle).await?;
        info!(bundle_id = %bundle.id, price = %bundle.discounted_price, "bundle created");
        self.events
            .publish(DomainEvent::Bundle(BundleEvent::Created {
                bundle_id: bundle.id,
                seller: caller.id,
                discounted_price: bundle.discounted_price,
            }))
            .await;
        Ok(bundle)
    }

    async fn find(&self, id: Uuid) -> Result<Bundle> {
        self.store.find_bundle(id).await?.ok_or_else(|| MarketError::not_found(BUNDLE_NOT_FOUND))
    }

    pub async fn get(&self, id: Uuid) -> Result<BundleView> {
        let bundle = self.find(id).await?;
        let members = self.store.find_products(&bundle.products).await?;
        Ok(bundle.into_view(&members))
    }

    /// Public listing with members attached; `seller` narrows it to one seller.
    #[instrument(skip(self))]
    pub async fn list(&self, request: PageRequest, seller: Option<Uuid>) -> Result<Page<BundleView>> {
        let (bundles, total) = self.store.list_bundles(seller, request.skip(), request.limit()).await?;
        let mut member_ids: Vec<Uuid> = bundles.iter().flat_map(|b| b.products.iter().copied()).collect();
        member_ids.sort_unstable();
        member_ids.dedup();
        let members = self.store.find_products(&member_ids).await?;
        debug!(returned = bundles.len(), total, "listed bundles");
        Ok(Page::new(bundles, request, total).map(|b| b.into_view(&members)))
    }

    #[instrument(skip(self, caller, changes), fields(caller = %caller.id))]
    pub async fn update(&self, caller: &Caller, id: Uuid, changes: BundleChanges) -> Result<Bundle> {
        ensure_seller(caller)?;
        let mut bundle = self.find(id).await?;
        ensure_owner(caller, bundle.seller, "update", "bundle")?;
        changes.validate()?;

        let mut repriced = false;
        if let Some(ids) = changes.products {
            let quote = self.compute_discount(&ids).await?;
            bundle.reprice(&quote.products)?;
            repriced = true;
        }
        if let Some(name) = changes.name {
            bundle.rename(name);
        }
        self.store.save_bundle(&bundle).await?;
        info!(bundle_id = %id, repriced, "bundle updated");

        let event = if repriced {
            BundleEvent::Repriced { bundle_id: id, discounted_price: bundle.discounted_price }
        } else {
            BundleEvent::Updated { bundle_id: id }
        };
        self.events.publish(DomainEvent::Bundle(event)).await;
        Ok(bundle)
    }

    #[instrument(skip(self, caller), fields(caller = %caller.id))]
    pub async fn delete(&self, caller: &Caller, id: Uuid) -> Result<()> {
        ensure_seller(caller)?;
        let bundle = self.find(id).await?;
        ensure_owner(caller, bundle.seller, "delete", "bundle")?;
        self.store.delete_bundle(id).await?;
        info!(bundle_id = %id, "bundle deleted");
        self.events.publish(DomainEvent::Bundle(BundleEvent::Deleted { bundle_id: id })).await;
        Ok(())
    }

    /// Recomputes the price from the members as they are now. Nothing is saved.
    ///
    /// Members deleted since the last pricing are left out; if fewer than two
    /// remain the bundle can no longer be priced.
    #[instrument(skip(self))]
    pub async fn check_discount(&self, id: Uuid) -> Result<DiscountCheck> {
        let bundle = self.find(id).await?;
        let members = self.store.find_products(&bundle.products).await?;
        if members.len() < bundle.products.len() {
            warn!(bundle_id = %id, missing = bundle.products.len() - members.len(), "bundle references deleted products");
        }
        bundle.check(&members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{NewProduct, ProductChanges};
    use crate::services::ProductService;
    use crate::store::MemoryStore;

    struct Fixture {
        store: Arc<dyn MarketStore>,
        products: ProductService,
        bundles: BundleService,
        seller: Caller,
    }

    fn fixture() -> Fixture {
        let store: Arc<dyn MarketStore> = Arc::new(MemoryStore::new());
        Fixture {
            store: store.clone(),
            products: ProductService::new(store.clone(), EventPublisher::disabled()),
            bundles: BundleService::new(store, EventPublisher::disabled()),
            seller: seller(),
        }
    }

    fn seller() -> Caller {
        Caller { id: Uuid::new_v4(), email: "s@example.com".into(), name: "S".into(), is_seller: true }
    }

    impl Fixture {
        async fn product(&self, price: i64, sale: Option<i64>) -> Product {
            let input = NewProduct {
                name: format!("item {price}"),
                price: Some(Decimal::new(price, 0)),
                on_sale: sale.is_some(),
                sale_price: sale.map(|s| Decimal::new(s, 0)),
                ..Default::default()
            };
            self.products.create(&self.seller, input).await.unwrap()
        }

        async fn bundle(&self, ids: Vec<Uuid>) -> Result<Bundle> {
            self.bundles
                .create(&self.seller, NewBundle { name: "Set".into(), products: Some(ids) })
                .await
        }
    }

    #[tokio::test]
    async fn test_create_prices_bundle() {
        let f = fixture();
        let a = f.product(10, None).await;
        let b = f.product(20, Some(15)).await;
        let bundle = f.bundle(vec![a.id, b.id]).await.unwrap();
        assert_eq!(bundle.discounted_price, Decimal::new(225, 1));
        assert_eq!(bundle.seller, f.seller.id);
    }

    #[tokio::test]
    async fn test_needs_two_distinct_products() {
        let f = fixture();
        let a = f.product(10, None).await;
        let err = f.bundle(vec![a.id, a.id]).await.unwrap_err();
        assert_eq!(err, MarketError::validation(pricing::TOO_FEW_PRODUCTS));
    }

    #[tokio::test]
    async fn test_unknown_products_do_not_count() {
        let f = fixture();
        let a = f.product(10, None).await;
        let err = f.bundle(vec![a.id, Uuid::new_v4()]).await.unwrap_err();
        assert_eq!(err, MarketError::validation(pricing::TOO_FEW_PRODUCTS));
    }

    #[tokio::test]
    async fn test_unknown_products_left_out() {
        let f = fixture();
        let a = f.product(10, None).await;
        let b = f.product(20, None).await;
        let bundle = f.bundle(vec![a.id, Uuid::new_v4(), b.id]).await.unwrap();
        assert_eq!(bundle.products, vec![a.id, b.id]);
        assert_eq!(bundle.discounted_price, Decimal::new(27, 0));
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let f = fixture();
        let err = f.bundles.create(&f.seller, NewBundle::default()).await.unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)));
    }

    #[tokio::test]
    async fn test_non_owner_rejected() {
        let f = fixture();
        let a = f.product(10, None).await;
        let b = f.product(20, None).await;
        let bundle = f.bundle(vec![a.id, b.id]).await.unwrap();

        let intruder = seller();
        let err = f.bundles.update(&intruder, bundle.id, BundleChanges::default()).await.unwrap_err();
        assert_eq!(err, MarketError::forbidden("Not authorized to update this bundle"));
        let err = f.bundles.delete(&intruder, bundle.id).await.unwrap_err();
        assert_eq!(err, MarketError::forbidden("Not authorized to delete this bundle"));

        let err = f.bundles.delete(&f.seller, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err, MarketError::not_found(BUNDLE_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_membership_change_reprices() {
        let f = fixture();
        let a = f.product(10, None).await;
        let b = f.product(20, None).await;
        let c = f.product(30, None).await;
        let bundle = f.bundle(vec![a.id, b.id]).await.unwrap();

        let changes = BundleChanges { name: Some("Bigger set".into()), products: Some(vec![a.id, b.id, c.id]) };
        let updated = f.bundles.update(&f.seller, bundle.id, changes).await.unwrap();
        assert_eq!(updated.name, "Bigger set");
        assert_eq!(updated.discounted_price, Decimal::new(54, 0));

        let err = f
            .bundles
            .update(&f.seller, bundle.id, BundleChanges { name: None, products: Some(vec![a.id]) })
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)));
    }

    #[tokio::test]
    async fn test_check_discount_round_trip() {
        let f = fixture();
        let a = f.product(10, None).await;
        let b = f.product(20, Some(15)).await;
        let bundle = f.bundle(vec![a.id, b.id]).await.unwrap();

        let check = f.bundles.check_discount(bundle.id).await.unwrap();
        assert_eq!(check.discounted_price, bundle.discounted_price);
        assert!(!check.changed);

        let changes = ProductChanges { on_sale: Some(false), ..Default::default() };
        f.products.update(&f.seller, b.id, changes).await.unwrap();
        let check = f.bundles.check_discount(bundle.id).await.unwrap();
        assert_eq!(check.discounted_price, Decimal::new(27, 0));
        assert!(check.changed);
        // stored snapshot untouched
        assert_eq!(f.bundles.get(bundle.id).await.unwrap().discounted_price, Decimal::new(225, 1));
    }

    #[tokio::test]
    async fn test_check_discount_after_member_deleted() {
        let f = fixture();
        let a = f.product(10, None).await;
        let b = f.product(20, None).await;
        let bundle = f.bundle(vec![a.id, b.id]).await.unwrap();
        f.products.delete(&f.seller, b.id).await.unwrap();
        let err = f.bundles.check_discount(bundle.id).await.unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_hydrates_members() {
        let f = fixture();
        let a = f.product(10, None).await;
        let b = f.product(20, None).await;
        f.bundle(vec![a.id, b.id]).await.unwrap();

        let page = f.bundles.list(PageRequest::default(), Some(f.seller.id)).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].products, vec![a, b]);
        let others = f.bundles.list(PageRequest::default(), Some(Uuid::new_v4())).await.unwrap();
        assert!(others.items.is_empty());
    }

    #[tokio::test]
    async fn test_overflowing_members_rejected() {
        let f = fixture();
        let mut ids = vec![];
        for price in [10, 20] {
            let mut p = f.product(price, None).await;
            p.price = Decimal::MAX;
            f.store.save_product(&p).await.unwrap();
            ids.push(p.id);
        }
        let err = f.bundle(ids).await.unwrap_err();
        assert_eq!(err, pricing::out_of_range());
    }
}
