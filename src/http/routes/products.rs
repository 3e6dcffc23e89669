use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use super::ListQuery;
use crate::auth::Caller;
use crate::domain::aggregates::{NewProduct, Product, ProductChanges};
use crate::domain::value_objects::Page;
use crate::http::error::ApiResult;
use crate::http::extract::{EntityId, JsonBody, MaybeCaller};
use crate::http::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product).patch(update_product).delete(delete_product))
}

async fn list_products(
    State(s): State<AppState>,
    MaybeCaller(caller): MaybeCaller,
    Query(q): Query<ListQuery>,
) -> ApiResult<Json<Page<Product>>> {
    let seller = q.seller_filter(caller.as_ref())?;
    Ok(Json(s.market.products.list(q.page_request(), seller).await?))
}

async fn create_product(
    State(s): State<AppState>,
    caller: Caller,
    JsonBody(body): JsonBody<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = s.market.products.create(&caller, body).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn get_product(State(s): State<AppState>, EntityId(id): EntityId) -> ApiResult<Json<Product>> {
    Ok(Json(s.market.products.get(id).await?))
}

async fn update_product(
    State(s): State<AppState>,
    caller: Caller,
    EntityId(id): EntityId,
    JsonBody(body): JsonBody<ProductChanges>,
) -> ApiResult<Json<Product>> {
    Ok(Json(s.market.products.update(&caller, id, body).await?))
}

async fn delete_product(State(s): State<AppState>, caller: Caller, EntityId(id): EntityId) -> ApiResult<Json<Value>> {
    s.market.products.delete(&caller, id).await?;
    Ok(Json(json!({"message": "Product deleted"})))
}
