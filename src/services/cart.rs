//! Per-user carts.
//!
//! Every operation answers with the hydrated cart, re-read from the store
//! after the write.

use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::aggregates::{Cart, CartView, ItemRef, ItemRequest};
use crate::domain::events::{CartEvent, DomainEvent};
use crate::events::EventPublisher;
use crate::store::MarketStore;
use crate::{MarketError, Result};

pub const CART_NOT_FOUND: &str = "Cart not found.";

#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn MarketStore>,
    events: EventPublisher,
}

impl CartService {
    pub fn new(store: Arc<dyn MarketStore>, events: EventPublisher) -> Self { Self { store, events } }

    /// The user's cart, created empty on first access.
    #[instrument(skip(self))]
    pub async fn get(&self, user: Uuid) -> Result<CartView> {
        let cart = self.load_or_create(user).await?;
        self.hydrate(&cart).await
    }

    #[instrument(skip(self))]
    pub async fn add(&self, user: Uuid, request: ItemRequest) -> Result<CartView> {
        let item = request.item_ref()?;
        self.ensure_exists(item).await?;
        let mut cart = self.load_or_create(user).await?;
        cart.add_item(item, request.quantity.unwrap_or(1))?;
        self.commit(&cart).await
    }

    #[instrument(skip(self))]
    pub async fn update(&self, user: Uuid, request: ItemRequest) -> Result<CartView> {
        let item = request.item_ref()?;
        let quantity = request
            .quantity
            .ok_or_else(|| MarketError::validation("Invalid item data."))?;
        let mut cart = self.load(user).await?;
        cart.update_quantity(item, quantity)?;
        self.commit(&cart).await
    }

    /// Removing an item that is not in the cart leaves the cart unchanged.
    #[instrument(skip(self))]
    pub async fn remove(&self, user: Uuid, request: ItemRequest) -> Result<CartView> {
        let item = request.item_ref()?;
        let mut cart = self.load(user).await?;
        if !cart.remove_item(item) {
            debug!(kind = item.kind(), target = %item.target(), "item not in cart");
        }
        self.commit(&cart).await
    }

    #[instrument(skip(self))]
    pub async fn clear(&self, user: Uuid) -> Result<CartView> {
        let mut cart = self.load(user).await?;
        cart.clear();
        self.store.save_cart(&cart).await?;
        info!(%user, "cart cleared");
        self.events.publish(DomainEvent::Cart(CartEvent::Cleared { user })).await;
        self.reload(user).await
    }

    async fn load(&self, user: Uuid) -> Result<Cart> {
        self.store.find_cart(user).await?.ok_or_else(|| MarketError::not_found(CART_NOT_FOUND))
    }

    async fn load_or_create(&self, user: Uuid) -> Result<Cart> {
        if let Some(cart) = self.store.find_cart(user).await? {
            return Ok(cart);
        }
        let cart = Cart::for_user(user);
        self.store.save_cart(&cart).await?;
        debug!(%user, "created empty cart");
        Ok(cart)
    }

    async fn ensure_exists(&self, item: ItemRef) -> Result<()> {
        let exists = match item {
            ItemRef::Product { product } => self.store.find_product(product).await?.is_some(),
            ItemRef::Bundle { bundle } => self.store.find_bundle(bundle).await?.is_some(),
        };
        if exists {
            Ok(())
        } else {
            Err(MarketError::not_found(format!("{} {} not found", capitalize(item.kind()), item.target())))
        }
    }

    /// Prices the cart before storing it, so a cart that cannot be totalled is never saved.
    async fn commit(&self, cart: &Cart) -> Result<CartView> {
        self.hydrate(cart).await?;
        self.store.save_cart(cart).await?;
        self.events
            .publish(DomainEvent::Cart(CartEvent::Changed { user: cart.user(), items: cart.item_count() }))
            .await;
        self.reload(cart.user()).await
    }

    async fn reload(&self, user: Uuid) -> Result<CartView> {
        let cart = self.load(user).await?;
        self.hydrate(&cart).await
    }

    async fn hydrate(&self, cart: &Cart) -> Result<CartView> {
        let (product_ids, bundle_ids) = cart.referenced();
        let products = self.store.find_products(&product_ids).await?;
        let bundles = self.store.find_bundles(&bundle_ids).await?;
        cart.hydrate(&products, &bundles)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Caller;
    use crate::domain::aggregates::{LineDetail, NewBundle, NewProduct, Product};
    use crate::services::{BundleService, ProductService};
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;

    struct Fixture {
        store: Arc<dyn MarketStore>,
        cart: CartService,
        products: ProductService,
        bundles: BundleService,
    }

    fn fixture() -> Fixture {
        let store: Arc<dyn MarketStore> = Arc::new(MemoryStore::new());
        Fixture {
            store: store.clone(),
            cart: CartService::new(store.clone(), EventPublisher::disabled()),
            products: ProductService::new(store.clone(), EventPublisher::disabled()),
            bundles: BundleService::new(store, EventPublisher::disabled()),
        }
    }

    fn seller() -> Caller {
        Caller { id: Uuid::new_v4(), email: "s@example.com".into(), name: "S".into(), is_seller: true }
    }

    async fn product(f: &Fixture, caller: &Caller, price: i64) -> Product {
        let input = NewProduct { name: "p".into(), price: Some(Decimal::new(price, 0)), ..Default::default() };
        f.products.create(caller, input).await.unwrap()
    }

    #[tokio::test]
    async fn test_get_creates_empty_cart() {
        let f = fixture();
        let user = Uuid::new_v4();
        let first = f.cart.get(user).await.unwrap();
        assert!(first.items.is_empty());
        let second = f.cart.get(user).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_add_merges_and_hydrates() {
        let f = fixture();
        let s = seller();
        let p = product(&f, &s, 10).await;
        let user = Uuid::new_v4();

        f.cart.add(user, ItemRequest::new(ItemRef::product(p.id), None)).await.unwrap();
        let view = f.cart.add(user, ItemRequest::new(ItemRef::product(p.id), Some(1))).await.unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].quantity, 2);
        assert_eq!(view.items[0].detail, LineDetail::Product { product: Some(p) });
        assert_eq!(view.subtotal, Decimal::new(20, 0));
    }

    #[tokio::test]
    async fn test_add_bundle_line() {
        let f = fixture();
        let s = seller();
        let a = product(&f, &s, 10).await;
        let b = product(&f, &s, 20).await;
        let bundle = f
            .bundles
            .create(&s, NewBundle { name: "set".into(), products: Some(vec![a.id, b.id]) })
            .await
            .unwrap();
        let view = f.cart.add(Uuid::new_v4(), ItemRequest::new(ItemRef::bundle(bundle.id), Some(2))).await.unwrap();
        assert_eq!(view.subtotal, Decimal::new(54, 0));
    }

    #[tokio::test]
    async fn test_add_unknown_target() {
        let f = fixture();
        let err = f
            .cart
            .add(Uuid::new_v4(), ItemRequest::new(ItemRef::bundle(Uuid::new_v4()), None))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_add_invalid_kind() {
        let f = fixture();
        let request = ItemRequest { kind: Some("voucher".into()), product: Some(Uuid::new_v4()), ..Default::default() };
        let err = f.cart.add(Uuid::new_v4(), request).await.unwrap_err();
        assert_eq!(err, MarketError::validation("Invalid item data."));
    }

    #[tokio::test]
    async fn test_update_requires_cart_and_item() {
        let f = fixture();
        let s = seller();
        let p = product(&f, &s, 10).await;
        let user = Uuid::new_v4();
        let item = ItemRef::product(p.id);

        let err = f.cart.update(user, ItemRequest::new(item, Some(3))).await.unwrap_err();
        assert_eq!(err, MarketError::not_found(CART_NOT_FOUND));

        f.cart.get(user).await.unwrap();
        let err = f.cart.update(user, ItemRequest::new(item, Some(3))).await.unwrap_err();
        assert!(matches!(err, MarketError::NotFound(_)));

        f.cart.add(user, ItemRequest::new(item, None)).await.unwrap();
        let err = f.cart.update(user, ItemRequest::new(item, None)).await.unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)));
        let view = f.cart.update(user, ItemRequest::new(item, Some(5))).await.unwrap();
        assert_eq!(view.items[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let f = fixture();
        let s = seller();
        let p = product(&f, &s, 10).await;
        let user = Uuid::new_v4();
        f.cart.add(user, ItemRequest::new(ItemRef::product(p.id), None)).await.unwrap();

        let view = f.cart.remove(user, ItemRequest::new(ItemRef::bundle(Uuid::new_v4()), None)).await.unwrap();
        assert_eq!(view.items.len(), 1);

        let view = f.cart.remove(user, ItemRequest::new(ItemRef::product(p.id), None)).await.unwrap();
        assert!(view.items.is_empty());

        f.cart.add(user, ItemRequest::new(ItemRef::product(p.id), Some(4))).await.unwrap();
        let view = f.cart.clear(user).await.unwrap();
        assert!(view.items.is_empty());
        assert_eq!(view.subtotal, Decimal::ZERO);

        let err = f.cart.clear(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err, MarketError::not_found(CART_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_quantity_above_cap_rejected() {
        let f = fixture();
        let p = product(&f, &seller(), 10).await;
        let user = Uuid::new_v4();
        let err = f.cart.add(user, ItemRequest::new(ItemRef::product(p.id), Some(4_000_000_000))).await.unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)));
        assert!(f.cart.get(user).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_unpriceable_cart_not_saved() {
        let f = fixture();
        let mut p = product(&f, &seller(), 10).await;
        p.price = Decimal::MAX;
        f.store.save_product(&p).await.unwrap();
        let user = Uuid::new_v4();

        let err = f.cart.add(user, ItemRequest::new(ItemRef::product(p.id), Some(2))).await.unwrap_err();
        assert_eq!(err, crate::domain::pricing::out_of_range());
        // the stored cart is still readable
        let view = f.cart.get(user).await.unwrap();
        assert!(view.items.is_empty());
    }
}
