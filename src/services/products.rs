//! Product catalog.

use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::auth::{ensure_owner, ensure_seller, Caller};
use crate::domain::aggregates::{NewProduct, Product, ProductChanges};
use crate::domain::events::{DomainEvent, ProductEvent};
use crate::domain::value_objects::{Page, PageRequest};
use crate::events::EventPublisher;
use crate::store::MarketStore;
use crate::{MarketError, Result};

pub const PRODUCT_NOT_FOUND: &str = "Product not found";

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn MarketStore>,
    events: EventPublisher,
}

impl ProductService {
    pub fn new(store: Arc<dyn MarketStore>, events: EventPublisher) -> Self { Self { store, events } }

    #[instrument(skip(self, caller, input), fields(seller = %caller.id))]
    pub async fn create(&self, caller: &Caller, input: NewProduct) -> Result<Product> {
        ensure_seller(caller)?;
        let product = Product::create(caller.id, input)?;
        self.store.insert_product(&product).await?;
        info!(product_id = %product.id, "product created");
        self.events
            .publish(DomainEvent::Product(ProductEvent::Created { product_id: product.id, seller: caller.id }))
            .await;
        Ok(product)
    }

    pub async fn get(&self, id: Uuid) -> Result<Product> {
        self.store.find_product(id).await?.ok_or_else(|| MarketError::not_found(PRODUCT_NOT_FOUND))
    }

    /// Public listing; `seller` narrows it to one seller's products.
    #[instrument(skip(self))]
    pub async fn list(&self, request: PageRequest, seller: Option<Uuid>) -> Result<Page<Product>> {
        let (items, total) = self.store.list_products(seller, request.skip(), request.limit()).await?;
        debug!(returned = items.len(), total, "listed products");
        Ok(Page::new(items, request, total))
    }

    #[instrument(skip(self, caller, changes), fields(caller = %caller.id))]
    pub async fn update(&self, caller: &Caller, id: Uuid, changes: ProductChanges) -> Result<Product> {
        ensure_seller(caller)?;
        let mut product = self.get(id).await?;
        ensure_owner(caller, product.seller, "update", "product")?;
        product.apply(changes)?;
        self.store.save_product(&product).await?;
        info!(product_id = %id, "product updated");
        self.events.publish(DomainEvent::Product(ProductEvent::Updated { product_id: id })).await;
        Ok(product)
    }

    #[instrument(skip(self, caller), fields(caller = %caller.id))]
    pub async fn delete(&self, caller: &Caller, id: Uuid) -> Result<()> {
        ensure_seller(caller)?;
        let product = self.get(id).await?;
        ensure_owner(caller, product.seller, "delete", "product")?;
        self.store.delete_product(id).await?;
        info!(product_id = %id, "product deleted");
        self.events.publish(DomainEvent::Product(ProductEvent::Deleted { product_id: id })).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;

    fn seller() -> Caller {
        Caller { id: Uuid::new_v4(), email: "s@example.com".into(), name: "S".into(), is_seller: true }
    }

    fn input(price: i64) -> NewProduct {
        NewProduct { name: "Chair".into(), price: Some(Decimal::new(price, 0)), ..Default::default() }
    }

    fn service() -> ProductService { ProductService::new(Arc::new(MemoryStore::new()), EventPublisher::disabled()) }

    #[tokio::test]
    async fn test_buyer_cannot_create() {
        let buyer = Caller { is_seller: false, ..seller() };
        let err = service().create(&buyer, input(10)).await.unwrap_err();
        assert!(matches!(err, MarketError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_only_owner_mutates() {
        let svc = service();
        let owner = seller();
        let other = seller();
        let product = svc.create(&owner, input(10)).await.unwrap();

        let err = svc.update(&other, product.id, ProductChanges::default()).await.unwrap_err();
        assert_eq!(err, MarketError::forbidden("Not authorized to update this product"));
        let err = svc.delete(&other, product.id).await.unwrap_err();
        assert_eq!(err, MarketError::forbidden("Not authorized to delete this product"));

        let changes = ProductChanges { price: Some(Decimal::new(12, 0)), ..Default::default() };
        assert_eq!(svc.update(&owner, product.id, changes).await.unwrap().price, Decimal::new(12, 0));
        svc.delete(&owner, product.id).await.unwrap();
        assert_eq!(svc.get(product.id).await.unwrap_err(), MarketError::not_found(PRODUCT_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_missing_product() {
        let err = service().update(&seller(), Uuid::new_v4(), ProductChanges::default()).await.unwrap_err();
        assert!(matches!(err, MarketError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_pagination() {
        let svc = service();
        let owner = seller();
        for price in 1..=25 {
            svc.create(&owner, input(price)).await.unwrap();
        }
        let page = svc.list(PageRequest::new(3, 10), None).await.unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total, 25);

        let beyond = svc.list(PageRequest::new(4, 10), None).await.unwrap();
        assert!(beyond.items.is_empty());

        let mine = svc.list(PageRequest::default(), Some(Uuid::new_v4())).await.unwrap();
        assert_eq!(mine.total, 0);
    }
}
