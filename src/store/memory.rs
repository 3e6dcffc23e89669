//! In-process store used by tests and when no database is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Listing, MarketStore};
use crate::domain::aggregates::{Bundle, Cart, Product, User};
use crate::{MarketError, Result};

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    products: HashMap<Uuid, Product>,
    bundles: HashMap<Uuid, Bundle>,
    carts: HashMap<Uuid, Cart>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

/// Stable listing order: creation time, then id.
fn page<T: Clone>(
    rows: impl Iterator<Item = T>,
    key: impl Fn(&T) -> (chrono::DateTime<chrono::Utc>, Uuid),
    skip: u64,
    limit: u32,
) -> Listing<T> {
    let mut all: Vec<T> = rows.collect();
    all.sort_by_key(|r| key(r));
    let total = all.len() as u64;
    let items = all
        .into_iter()
        .skip(usize::try_from(skip).unwrap_or(usize::MAX))
        .take(limit as usize)
        .collect();
    (items, total)
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(MarketError::validation("Email already registered."));
        }
        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.inner.read().await.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert_product(&self, product: &Product) -> Result<()> {
        self.inner.write().await.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn save_product(&self, product: &Product) -> Result<()> {
        self.insert_product(product).await
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool> {
        Ok(self.inner.write().await.products.remove(&id).is_some())
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self.inner.read().await.products.get(&id).cloned())
    }

    async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
        let inner = self.inner.read().await;
        Ok(ids.iter().filter_map(|id| inner.products.get(id).cloned()).collect())
    }

    async fn list_products(&self, seller: Option<Uuid>, skip: u64, limit: u32) -> Result<Listing<Product>> {
        let inner = self.inner.read().await;
        let rows = inner
            .products
            .values()
            .filter(|p| seller.map_or(true, |s| p.seller == s))
            .cloned();
        Ok(page(rows, |p| (p.created_at, p.id), skip, limit))
    }

    async fn insert_bundle(&self, bundle: &Bundle) -> Result<()> {
        self.inner.write().await.bundles.insert(bundle.id, bundle.clone());
        Ok(())
    }

    async fn save_bundle(&self, bundle: &Bundle) -> Result<()> {
        self.insert_bundle(bundle).await
    }

    async fn delete_bundle(&self, id: Uuid) -> Result<bool> {
        Ok(self.inner.write().await.bundles.remove(&id).is_some())
    }

    async fn find_bundle(&self, id: Uuid) -> Result<Option<Bundle>> {
        Ok(self.inner.read().await.bundles.get(&id).cloned())
    }

    async fn find_bundles(&self, ids: &[Uuid]) -> Result<Vec<Bundle>> {
        let inner = self.inner.read().await;
        Ok(ids.iter().filter_map(|id| inner.bundles.get(id).cloned()).collect())
    }

    async fn list_bundles(&self, seller: Option<Uuid>, skip: u64, limit: u32) -> Result<Listing<Bundle>> {
        let inner = self.inner.read().await;
        let rows = inner
            .bundles
            .values()
            .filter(|b| seller.map_or(true, |s| b.seller == s))
            .cloned();
        Ok(page(rows, |b| (b.created_at, b.id), skip, limit))
    }

    async fn find_cart(&self, user: Uuid) -> Result<Option<Cart>> {
        Ok(self.inner.read().await.carts.get(&user).cloned())
    }

    async fn save_cart(&self, cart: &Cart) -> Result<()> {
        self.inner.write().await.carts.insert(cart.user(), cart.clone());
        Ok(())
    }
}
