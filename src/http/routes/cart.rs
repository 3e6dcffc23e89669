use axum::extract::State;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};

use crate::auth::Caller;
use crate::domain::aggregates::{CartView, ItemRequest};
use crate::http::error::ApiResult;
use crate::http::extract::JsonBody;
use crate::http::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).delete(clear_cart))
        .route("/add", post(add_to_cart))
        .route("/update", patch(update_item))
        .route("/remove", delete(remove_item))
        .route("/clear", post(clear_cart))
}

async fn get_cart(State(s): State<AppState>, caller: Caller) -> ApiResult<Json<CartView>> {
    Ok(Json(s.market.cart.get(caller.id).await?))
}

async fn add_to_cart(State(s): State<AppState>, caller: Caller, JsonBody(body): JsonBody<ItemRequest>) -> ApiResult<Json<CartView>> {
    Ok(Json(s.market.cart.add(caller.id, body).await?))
}

async fn update_item(State(s): State<AppState>, caller: Caller, JsonBody(body): JsonBody<ItemRequest>) -> ApiResult<Json<CartView>> {
    Ok(Json(s.market.cart.update(caller.id, body).await?))
}

async fn remove_item(State(s): State<AppState>, caller: Caller, JsonBody(body): JsonBody<ItemRequest>) -> ApiResult<Json<CartView>> {
    Ok(Json(s.market.cart.remove(caller.id, body).await?))
}

async fn clear_cart(State(s): State<AppState>, caller: Caller) -> ApiResult<Json<CartView>> {
    Ok(Json(s.market.cart.clear(caller.id).await?))
}
