//! Client state and its reducer.

use uuid::Uuid;

use crate::domain::aggregates::{BundleView, CartView, Product, User};
use crate::services::LoginResponse;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slice {
    User,
    Products,
    Bundles,
    Cart,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub status: Status,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductsState {
    pub items: Vec<Product>,
    pub status: Status,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BundlesState {
    pub items: Vec<BundleView>,
    pub status: Status,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CartState {
    pub cart: Option<CartView>,
    pub status: Status,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClientState {
    pub user: UserState,
    pub products: ProductsState,
    pub bundles: BundlesState,
    pub cart: CartState,
}

impl ClientState {
    pub fn token(&self) -> Option<&str> { self.user.token.as_deref() }

    pub fn is_authenticated(&self) -> bool { self.user.token.is_some() }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Pending(Slice),
    Rejected(Slice, String),
    LoggedIn(LoginResponse),
    /// Drops the identity and everything fetched on its behalf.
    Logout,
    ProductsLoaded(Vec<Product>),
    ProductCreated(Product),
    ProductUpdated(Product),
    ProductDeleted(Uuid),
    BundlesLoaded(Vec<BundleView>),
    BundleCreated(BundleView),
    BundleUpdated(BundleView),
    BundleDeleted(Uuid),
    CartLoaded(CartView),
}

pub fn reduce(mut state: ClientState, action: Action) -> ClientState {
    match action {
        Action::Pending(slice) => {
            let (status, error) = slot(&mut state, slice);
            *status = Status::Loading;
            *error = None;
        }
        Action::Rejected(slice, message) => {
            let (status, error) = slot(&mut state, slice);
            *status = Status::Failed;
            *error = Some(message);
        }
        Action::LoggedIn(LoginResponse { token, user }) => {
            state.user = UserState { user: Some(user), token: Some(token), status: Status::Succeeded, error: None };
        }
        Action::Logout => {
            state.user = UserState::default();
            state.cart = CartState::default();
        }
        Action::ProductsLoaded(items) => {
            state.products.items = items;
            state.products.status = Status::Succeeded;
        }
        Action::ProductCreated(product) => {
            state.products.items.push(product);
            state.products.status = Status::Succeeded;
        }
        Action::ProductUpdated(product) => {
            if let Some(existing) = state.products.items.iter_mut().find(|p| p.id == product.id) {
                *existing = product;
            }
            state.products.status = Status::Succeeded;
        }
        Action::ProductDeleted(id) => {
            state.products.items.retain(|p| p.id != id);
            state.products.status = Status::Succeeded;
        }
        Action::BundlesLoaded(items) => {
            state.bundles.items = items;
            state.bundles.status = Status::Succeeded;
        }
        Action::BundleCreated(bundle) => {
            state.bundles.items.push(bundle);
            state.bundles.status = Status::Succeeded;
        }
        Action::BundleUpdated(bundle) => {
            if let Some(existing) = state.bundles.items.iter_mut().find(|b| b.id == bundle.id) {
                *existing = bundle;
            }
            state.bundles.status = Status::Succeeded;
        }
        Action::BundleDeleted(id) => {
            state.bundles.items.retain(|b| b.id != id);
            state.bundles.status = Status::Succeeded;
        }
        Action::CartLoaded(cart) => {
            state.cart.cart = Some(cart);
            state.cart.status = Status::Succeeded;
        }
    }
    state
}

fn slot(state: &mut ClientState, slice: Slice) -> (&mut Status, &mut Option<String>) {
    match slice {
        Slice::User => (&mut state.user.status, &mut state.user.error),
        Slice::Products => (&mut state.products.status, &mut state.products.error),
        Slice::Bundles => (&mut state.bundles.status, &mut state.bundles.error),
        Slice::Cart => (&mut state.cart.status, &mut state.cart.error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::NewProduct;
    use rust_decimal::Decimal;

    fn product(price: i64) -> Product {
        Product::create(Uuid::new_v4(), NewProduct { name: "p".into(), price: Some(Decimal::new(price, 0)), ..Default::default() })
            .unwrap()
    }

    #[test]
    fn test_request_lifecycle() {
        let state = reduce(ClientState::default(), Action::Pending(Slice::Products));
        assert_eq!(state.products.status, Status::Loading);

        let state = reduce(state, Action::Rejected(Slice::Products, "boom".into()));
        assert_eq!(state.products.status, Status::Failed);
        assert_eq!(state.products.error.as_deref(), Some("boom"));

        let state = reduce(state, Action::Pending(Slice::Products));
        assert_eq!(state.products.error, None);
        let state = reduce(state, Action::ProductsLoaded(vec![product(1)]));
        assert_eq!(state.products.status, Status::Succeeded);
        assert_eq!(state.products.items.len(), 1);
        assert_eq!(state.bundles, BundlesState::default());
    }

    #[test]
    fn test_product_mutations() {
        let a = product(1);
        let b = product(2);
        let state = reduce(ClientState::default(), Action::ProductsLoaded(vec![a.clone()]));
        let state = reduce(state, Action::ProductCreated(b.clone()));
        assert_eq!(state.products.items, vec![a.clone(), b.clone()]);

        let mut renamed = a.clone();
        renamed.name = "renamed".into();
        let state = reduce(state, Action::ProductUpdated(renamed.clone()));
        assert_eq!(state.products.items[0].name, "renamed");

        // Updates for items not in the list are ignored.
        let state = reduce(state, Action::ProductUpdated(product(3)));
        assert_eq!(state.products.items.len(), 2);

        let state = reduce(state, Action::ProductDeleted(a.id));
        assert_eq!(state.products.items, vec![b]);
    }

    #[test]
    fn test_login_and_logout() {
        let user = User::new("Sam", "sam@example.com", String::new(), true);
        let state = reduce(ClientState::default(), Action::Pending(Slice::User));
        let state = reduce(state, Action::LoggedIn(LoginResponse { token: "t".into(), user: user.clone() }));
        assert!(state.is_authenticated());
        assert_eq!(state.user.user, Some(user));
        assert_eq!(state.user.status, Status::Succeeded);

        let state = reduce(state, Action::ProductsLoaded(vec![product(1)]));
        let state = reduce(state, Action::Logout);
        assert!(!state.is_authenticated());
        assert_eq!(state.user, UserState::default());
        assert_eq!(state.products.items.len(), 1);
    }
}
