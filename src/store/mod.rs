//! Persistence for users, products, bundles and carts.
//!
//! References between entities are plain ids with no foreign keys; services
//! check existence themselves. Writes replace whole documents (last write
//! wins).

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::aggregates::{Bundle, Cart, Product, User};
use crate::Result;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Page of rows plus the total number of rows matching the filter.
pub type Listing<T> = (Vec<T>, u64);

#[async_trait]
pub trait MarketStore: Send + Sync {
    /// Fails with a validation error if the email is already registered.
    async fn insert_user(&self, user: &User) -> Result<()>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn insert_product(&self, product: &Product) -> Result<()>;
    async fn save_product(&self, product: &Product) -> Result<()>;
    async fn delete_product(&self, id: Uuid) -> Result<bool>;
    async fn find_product(&self, id: Uuid) -> Result<Option<Product>>;
    /// Products among `ids` that exist; unknown ids are skipped.
    async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<Product>>;
    async fn list_products(&self, seller: Option<Uuid>, skip: u64, limit: u32) -> Result<Listing<Product>>;

    async fn insert_bundle(&self, bundle: &Bundle) -> Result<()>;
    async fn save_bundle(&self, bundle: &Bundle) -> Result<()>;
    async fn delete_bundle(&self, id: Uuid) -> Result<bool>;
    async fn find_bundle(&self, id: Uuid) -> Result<Option<Bundle>>;
    async fn find_bundles(&self, ids: &[Uuid]) -> Result<Vec<Bundle>>;
    async fn list_bundles(&self, seller: Option<Uuid>, skip: u64, limit: u32) -> Result<Listing<Bundle>>;

    async fn find_cart(&self, user: Uuid) -> Result<Option<Cart>>;
    /// Inserts or replaces the cart of `cart.user()`.
    async fn save_cart(&self, cart: &Cart) -> Result<()>;
}
