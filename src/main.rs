//! Marketplace Bundles - products, discounted bundles and per-user carts

use std::sync::Arc;

use anyhow::Result;
use marketplace_bundles::auth::JwtManager;
use marketplace_bundles::config::Config;
use marketplace_bundles::events::EventPublisher;
use marketplace_bundles::http::{build_app, AppState};
use marketplace_bundles::store::{MarketStore, MemoryStore, PgStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;

    let store: Arc<dyn MarketStore> = match &config.database_url {
        Some(url) => Arc::new(PgStore::connect(url).await?),
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };
    let events = match &config.nats_url {
        Some(url) => EventPublisher::connect(url).await,
        None => EventPublisher::disabled(),
    };
    let jwt = JwtManager::new(&config.jwt_secret, config.jwt_lifetime_secs);

    let app = build_app(AppState::new(store, events, jwt));

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("marketplace-bundles listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
