//! Application services: authorization plus core logic over a [`MarketStore`].
//!
//! Callers arrive already authenticated; services only check capabilities
//! and ownership against the identity they are given.

pub mod bundles;
pub mod cart;
pub mod products;
pub mod users;

use std::sync::Arc;

use crate::auth::JwtManager;
use crate::events::EventPublisher;
use crate::store::MarketStore;

pub use bundles::{BundleQuote, BundleService};
pub use cart::CartService;
pub use products::ProductService;
pub use users::{LoginResponse, UserService};

#[derive(Clone)]
pub struct Marketplace {
    pub users: UserService,
    pub products: ProductService,
    pub bundles: BundleService,
    pub cart: CartService,
}

impl Marketplace {
    pub fn new(store: Arc<dyn MarketStore>, events: EventPublisher, jwt: Arc<JwtManager>) -> Self {
        Self {
            users: UserService::new(store.clone(), jwt),
            products: ProductService::new(store.clone(), events.clone()),
            bundles: BundleService::new(store.clone(), events.clone()),
            cart: CartService::new(store, events),
        }
    }
}
