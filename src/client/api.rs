//! Typed wrappers over the HTTP API.

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::Caller;
use crate::domain::aggregates::{
    Bundle, BundleChanges, BundleView, CartView, Credentials, DiscountCheck, ItemRequest, NewBundle, NewProduct,
    Product, ProductChanges, Registration, User,
};
use crate::domain::value_objects::{Page, PageRequest};
use crate::services::LoginResponse;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered 401; the session should be dropped.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{message}")]
    Api { status: u16, message: String },
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Serialize)]
struct ListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seller: Option<&'static str>,
}

impl ListParams {
    fn new(request: PageRequest, mine: bool) -> Self {
        Self { page: request.page, limit: request.limit, seller: mine.then_some("me") }
    }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.into().trim_end_matches('/').to_string(), token: None }
    }

    pub fn set_token(&mut self, token: Option<String>) { self.token = token; }

    pub fn token(&self) -> Option<&str> { self.token.as_deref() }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = check(builder.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ClientError> {
        check(builder.send().await?).await?;
        Ok(())
    }

    pub async fn register(&self, input: &Registration) -> Result<User, ClientError> {
        self.send(self.request(Method::POST, "/users/register").json(input)).await
    }

    pub async fn login(&self, input: &Credentials) -> Result<LoginResponse, ClientError> {
        self.send(self.request(Method::POST, "/users/login").json(input)).await
    }

    pub async fn me(&self) -> Result<Caller, ClientError> {
        self.send(self.request(Method::GET, "/users/me")).await
    }

    /// `mine` restricts the listing to the caller's own products.
    pub async fn list_products(&self, page: PageRequest, mine: bool) -> Result<Page<Product>, ClientError> {
        self.send(self.request(Method::GET, "/products").query(&ListParams::new(page, mine))).await
    }

    pub async fn get_product(&self, id: Uuid) -> Result<Product, ClientError> {
        self.send(self.request(Method::GET, &format!("/products/{id}"))).await
    }

    pub async fn create_product(&self, input: &NewProduct) -> Result<Product, ClientError> {
        self.send(self.request(Method::POST, "/products").json(input)).await
    }

    pub async fn update_product(&self, id: Uuid, changes: &ProductChanges) -> Result<Product, ClientError> {
        self.send(self.request(Method::PATCH, &format!("/products/{id}")).json(changes)).await
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<(), ClientError> {
        self.send_empty(self.request(Method::DELETE, &format!("/products/{id}"))).await
    }

    pub async fn list_bundles(&self, page: PageRequest, mine: bool) -> Result<Page<BundleView>, ClientError> {
        self.send(self.request(Method::GET, "/bundles").query(&ListParams::new(page, mine))).await
    }

    pub async fn get_bundle(&self, id: Uuid) -> Result<BundleView, ClientError> {
        self.send(self.request(Method::GET, &format!("/bundles/{id}"))).await
    }

    pub async fn create_bundle(&self, input: &NewBundle) -> Result<Bundle, ClientError> {
        self.send(self.request(Method::POST, "/bundles").json(input)).await
    }

    pub async fn update_bundle(&self, id: Uuid, changes: &BundleChanges) -> Result<Bundle, ClientError> {
        self.send(self.request(Method::PATCH, &format!("/bundles/{id}")).json(changes)).await
    }

    pub async fn delete_bundle(&self, id: Uuid) -> Result<(), ClientError> {
        self.send_empty(self.request(Method::DELETE, &format!("/bundles/{id}"))).await
    }

    pub async fn check_discount(&self, id: Uuid) -> Result<DiscountCheck, ClientError> {
        self.send(self.request(Method::GET, &format!("/bundles/{id}/checkDiscount"))).await
    }

    pub async fn get_cart(&self) -> Result<CartView, ClientError> {
        self.send(self.request(Method::GET, "/cart")).await
    }

    pub async fn add_to_cart(&self, item: &ItemRequest) -> Result<CartView, ClientError> {
        self.send(self.request(Method::POST, "/cart/add").json(item)).await
    }

    pub async fn update_cart_item(&self, item: &ItemRequest) -> Result<CartView, ClientError> {
        self.send(self.request(Method::PATCH, "/cart/update").json(item)).await
    }

    pub async fn remove_from_cart(&self, item: &ItemRequest) -> Result<CartView, ClientError> {
        self.send(self.request(Method::DELETE, "/cart/remove").json(item)).await
    }

    pub async fn clear_cart(&self) -> Result<CartView, ClientError> {
        self.send(self.request(Method::POST, "/cart/clear")).await
    }
}

/// Turns non-2xx responses into errors carrying the server's message.
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized(message));
    }
    Err(ClientError::Api { status: status.as_u16(), message })
}
