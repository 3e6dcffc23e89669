//! Postgres-backed store.
//!
//! Bundles keep their member ids in a `UUID[]` column and carts keep their
//! line items as `JSONB`, mirroring the document layout of the API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{Listing, MarketStore};
use crate::domain::aggregates::{Bundle, Cart, CartItem, Product, User};
use crate::{MarketError, Result};

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct CartRow {
    id: Uuid,
    user_id: Uuid,
    items: Json<Vec<CartItem>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Cart::restore(row.id, row.user_id, row.items.0, row.created_at, row.updated_at)
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    /// Connects and applies the embedded migrations.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| MarketError::Storage(format!("migration failed: {e}")))?;
        info!("database migrations applied");
        Ok(Self::new(pool))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION))
}

fn offset(skip: u64) -> i64 { i64::try_from(skip).unwrap_or(i64::MAX) }

#[async_trait]
impl MarketStore for PgStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query("INSERT INTO users (id, name, email, password_hash, is_seller, created_at) VALUES ($1, $2, $3, $4, $5, $6)")
            .bind(user.id).bind(&user.name).bind(&user.email).bind(&user.password_hash).bind(user.is_seller).bind(user.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) { MarketError::validation("Email already registered.") } else { e.into() }
            })?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1").bind(email).fetch_optional(&self.pool).await?)
    }

    async fn insert_product(&self, product: &Product) -> Result<()> {
        sqlx::query("INSERT INTO products (id, name, description, price, on_sale, sale_price, seller, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)")
            .bind(product.id).bind(&product.name).bind(&product.description).bind(product.price)
            .bind(product.on_sale).bind(product.sale_price).bind(product.seller)
            .bind(product.created_at).bind(product.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_product(&self, product: &Product) -> Result<()> {
        sqlx::query("UPDATE products SET name = $2, description = $3, price = $4, on_sale = $5, sale_price = $6, updated_at = $7 WHERE id = $1")
            .bind(product.id).bind(&product.name).bind(&product.description).bind(product.price)
            .bind(product.on_sale).bind(product.sale_price).bind(product.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool> {
        let done = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(done.rows_affected() > 0)
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(&self.pool).await?)
    }

    async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        Ok(sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_products(&self, seller: Option<Uuid>, skip: u64, limit: u32) -> Result<Listing<Product>> {
        let items = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE ($1::uuid IS NULL OR seller = $1) ORDER BY created_at, id LIMIT $2 OFFSET $3")
            .bind(seller).bind(i64::from(limit)).bind(offset(skip))
            .fetch_all(&self.pool)
            .await?;
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE ($1::uuid IS NULL OR seller = $1)")
            .bind(seller)
            .fetch_one(&self.pool)
            .await?;
        Ok((items, total.0.max(0) as u64))
    }

    async fn insert_bundle(&self, bundle: &Bundle) -> Result<()> {
        sqlx::query("INSERT INTO bundles (id, name, products, seller, discounted_price, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7)")
            .bind(bundle.id).bind(&bundle.name).bind(&bundle.products).bind(bundle.seller)
            .bind(bundle.discounted_price).bind(bundle.created_at).bind(bundle.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_bundle(&self, bundle: &Bundle) -> Result<()> {
        sqlx::query("UPDATE bundles SET name = $2, products = $3, discounted_price = $4, updated_at = $5 WHERE id = $1")
            .bind(bundle.id).bind(&bundle.name).bind(&bundle.products)
            .bind(bundle.discounted_price).bind(bundle.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_bundle(&self, id: Uuid) -> Result<bool> {
        let done = sqlx::query("DELETE FROM bundles WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(done.rows_affected() > 0)
    }

    async fn find_bundle(&self, id: Uuid) -> Result<Option<Bundle>> {
        Ok(sqlx::query_as::<_, Bundle>("SELECT * FROM bundles WHERE id = $1").bind(id).fetch_optional(&self.pool).await?)
    }

    async fn find_bundles(&self, ids: &[Uuid]) -> Result<Vec<Bundle>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        Ok(sqlx::query_as::<_, Bundle>("SELECT * FROM bundles WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_bundles(&self, seller: Option<Uuid>, skip: u64, limit: u32) -> Result<Listing<Bundle>> {
        let items = sqlx::query_as::<_, Bundle>("SELECT * FROM bundles WHERE ($1::uuid IS NULL OR seller = $1) ORDER BY created_at, id LIMIT $2 OFFSET $3")
            .bind(seller).bind(i64::from(limit)).bind(offset(skip))
            .fetch_all(&self.pool)
            .await?;
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bundles WHERE ($1::uuid IS NULL OR seller = $1)")
            .bind(seller)
            .fetch_one(&self.pool)
            .await?;
        Ok((items, total.0.max(0) as u64))
    }

    async fn find_cart(&self, user: Uuid) -> Result<Option<Cart>> {
        let row = sqlx::query_as::<_, CartRow>("SELECT * FROM carts WHERE user_id = $1")
            .bind(user)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Cart::from))
    }

    async fn save_cart(&self, cart: &Cart) -> Result<()> {
        sqlx::query("INSERT INTO carts (id, user_id, items, created_at, updated_at) VALUES ($1, $2, $3, $4, $5) ON CONFLICT (user_id) DO UPDATE SET items = EXCLUDED.items, updated_at = EXCLUDED.updated_at")
            .bind(cart.id()).bind(cart.user()).bind(Json(cart.items())).bind(cart.created_at()).bind(cart.updated_at())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
