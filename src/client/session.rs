//! Request orchestration on top of [`ApiClient`] and [`reduce`].

use tracing::debug;
use uuid::Uuid;

use super::api::{ApiClient, ClientError};
use super::state::{reduce, Action, ClientState, Slice};
use crate::domain::aggregates::{BundleChanges, Credentials, ItemRef, ItemRequest, NewBundle, NewProduct, ProductChanges};
use crate::domain::value_objects::PageRequest;

pub type SessionResult = Result<(), ClientError>;

/// A logged-in (or anonymous) user's view of the marketplace.
pub struct Session {
    api: ApiClient,
    state: ClientState,
}

impl Session {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { api: ApiClient::new(base_url), state: ClientState::default() }
    }

    pub fn state(&self) -> &ClientState { &self.state }

    pub fn api(&self) -> &ApiClient { &self.api }

    pub fn dispatch(&mut self, action: Action) {
        debug!(?action, "dispatch");
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
        self.api.set_token(self.state.user.token.clone());
    }

    /// Dispatches the outcome of a request. A 401 ends the session before
    /// the rejection is recorded.
    fn settle<T>(&mut self, slice: Slice, result: Result<T, ClientError>, fulfilled: impl FnOnce(T) -> Action) -> SessionResult {
        match result {
            Ok(value) => {
                self.dispatch(fulfilled(value));
                Ok(())
            }
            Err(err) => {
                if matches!(err, ClientError::Unauthorized(_)) && slice != Slice::User {
                    self.dispatch(Action::Logout);
                }
                self.dispatch(Action::Rejected(slice, err.to_string()));
                Err(err)
            }
        }
    }

    pub async fn login(&mut self, email: &str, password: &str) -> SessionResult {
        self.dispatch(Action::Pending(Slice::User));
        let credentials = Credentials { email: email.to_string(), password: password.to_string() };
        let result = self.api.login(&credentials).await;
        self.settle(Slice::User, result, Action::LoggedIn)
    }

    pub fn logout(&mut self) { self.dispatch(Action::Logout); }

    pub async fn fetch_products(&mut self, page: PageRequest) -> SessionResult {
        self.dispatch(Action::Pending(Slice::Products));
        let result = self.api.list_products(page, false).await;
        self.settle(Slice::Products, result, |p| Action::ProductsLoaded(p.items))
    }

    pub async fn fetch_seller_products(&mut self, page: PageRequest) -> SessionResult {
        self.dispatch(Action::Pending(Slice::Products));
        let result = self.api.list_products(page, true).await;
        self.settle(Slice::Products, result, |p| Action::ProductsLoaded(p.items))
    }

    pub async fn create_product(&mut self, input: NewProduct) -> SessionResult {
        self.dispatch(Action::Pending(Slice::Products));
        let result = self.api.create_product(&input).await;
        self.settle(Slice::Products, result, Action::ProductCreated)
    }

    pub async fn update_product(&mut self, id: Uuid, changes: ProductChanges) -> SessionResult {
        self.dispatch(Action::Pending(Slice::Products));
        let result = self.api.update_product(id, &changes).await;
        self.settle(Slice::Products, result, Action::ProductUpdated)
    }

    pub async fn delete_product(&mut self, id: Uuid) -> SessionResult {
        self.dispatch(Action::Pending(Slice::Products));
        let result = self.api.delete_product(id).await;
        self.settle(Slice::Products, result, |()| Action::ProductDeleted(id))
    }

    pub async fn fetch_bundles(&mut self, page: PageRequest) -> SessionResult {
        self.dispatch(Action::Pending(Slice::Bundles));
        let result = self.api.list_bundles(page, false).await;
        self.settle(Slice::Bundles, result, |p| Action::BundlesLoaded(p.items))
    }

    pub async fn fetch_seller_bundles(&mut self, page: PageRequest) -> SessionResult {
        self.dispatch(Action::Pending(Slice::Bundles));
        let result = self.api.list_bundles(page, true).await;
        self.settle(Slice::Bundles, result, |p| Action::BundlesLoaded(p.items))
    }

    /// Creates the bundle, then reads it back with its products resolved.
    pub async fn create_bundle(&mut self, input: NewBundle) -> SessionResult {
        self.dispatch(Action::Pending(Slice::Bundles));
        let result = match self.api.create_bundle(&input).await {
            Ok(bundle) => self.api.get_bundle(bundle.id).await,
            Err(err) => Err(err),
        };
        self.settle(Slice::Bundles, result, Action::BundleCreated)
    }

    pub async fn update_bundle(&mut self, id: Uuid, changes: BundleChanges) -> SessionResult {
        self.dispatch(Action::Pending(Slice::Bundles));
        let result = match self.api.update_bundle(id, &changes).await {
            Ok(bundle) => self.api.get_bundle(bundle.id).await,
            Err(err) => Err(err),
        };
        self.settle(Slice::Bundles, result, Action::BundleUpdated)
    }

    pub async fn delete_bundle(&mut self, id: Uuid) -> SessionResult {
        self.dispatch(Action::Pending(Slice::Bundles));
        let result = self.api.delete_bundle(id).await;
        self.settle(Slice::Bundles, result, |()| Action::BundleDeleted(id))
    }

    pub async fn fetch_cart(&mut self) -> SessionResult {
        self.dispatch(Action::Pending(Slice::Cart));
        let result = self.api.get_cart().await;
        self.settle(Slice::Cart, result, Action::CartLoaded)
    }

    pub async fn add_to_cart(&mut self, item: ItemRef, quantity: u32) -> SessionResult {
        self.dispatch(Action::Pending(Slice::Cart));
        let result = self.api.add_to_cart(&ItemRequest::new(item, Some(quantity))).await;
        self.settle(Slice::Cart, result, Action::CartLoaded)
    }

    pub async fn update_cart_item(&mut self, item: ItemRef, quantity: u32) -> SessionResult {
        self.dispatch(Action::Pending(Slice::Cart));
        let result = self.api.update_cart_item(&ItemRequest::new(item, Some(quantity))).await;
        self.settle(Slice::Cart, result, Action::CartLoaded)
    }

    pub async fn remove_from_cart(&mut self, item: ItemRef) -> SessionResult {
        self.dispatch(Action::Pending(Slice::Cart));
        let result = self.api.remove_from_cart(&ItemRequest::new(item, None)).await;
        self.settle(Slice::Cart, result, Action::CartLoaded)
    }

    pub async fn clear_cart(&mut self) -> SessionResult {
        self.dispatch(Action::Pending(Slice::Cart));
        let result = self.api.clear_cart().await;
        self.settle(Slice::Cart, result, Action::CartLoaded)
    }
}
