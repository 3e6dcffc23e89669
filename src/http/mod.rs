//! HTTP surface: router, shared state and extractors.

pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::JwtManager;
use crate::events::EventPublisher;
use crate::services::Marketplace;
use crate::store::MarketStore;

#[derive(Clone)]
pub struct AppState {
    pub market: Marketplace,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(store: Arc<dyn MarketStore>, events: EventPublisher, jwt: JwtManager) -> Self {
        let jwt = Arc::new(jwt);
        Self { market: Marketplace::new(store, events, jwt.clone()), jwt }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "marketplace-bundles"})) }))
        .nest("/users", routes::users::router())
        .nest("/products", routes::products::router())
        .nest("/bundles", routes::bundles::router())
        .nest("/cart", routes::cart::router())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state)
}
