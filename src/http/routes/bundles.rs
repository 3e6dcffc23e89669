use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use super::ListQuery;
use crate::auth::Caller;
use crate::domain::aggregates::{Bundle, BundleChanges, BundleView, DiscountCheck, NewBundle};
use crate::domain::value_objects::Page;
use crate::http::error::ApiResult;
use crate::http::extract::{EntityId, JsonBody, MaybeCaller};
use crate::http::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bundles).post(create_bundle))
        .route("/:id", get(get_bundle).patch(update_bundle).delete(delete_bundle))
        .route("/:id/checkDiscount", get(check_discount))
}

async fn list_bundles(
    State(s): State<AppState>,
    MaybeCaller(caller): MaybeCaller,
    Query(q): Query<ListQuery>,
) -> ApiResult<Json<Page<BundleView>>> {
    let seller = q.seller_filter(caller.as_ref())?;
    Ok(Json(s.market.bundles.list(q.page_request(), seller).await?))
}

async fn create_bundle(
    State(s): State<AppState>,
    caller: Caller,
    JsonBody(body): JsonBody<NewBundle>,
) -> ApiResult<(StatusCode, Json<Bundle>)> {
    let bundle = s.market.bundles.create(&caller, body).await?;
    Ok((StatusCode::CREATED, Json(bundle)))
}

async fn get_bundle(State(s): State<AppState>, EntityId(id): EntityId) -> ApiResult<Json<BundleView>> {
    Ok(Json(s.market.bundles.get(id).await?))
}

async fn update_bundle(
    State(s): State<AppState>,
    caller: Caller,
    EntityId(id): EntityId,
    JsonBody(body): JsonBody<BundleChanges>,
) -> ApiResult<Json<Bundle>> {
    Ok(Json(s.market.bundles.update(&caller, id, body).await?))
}

async fn delete_bundle(State(s): State<AppState>, caller: Caller, EntityId(id): EntityId) -> ApiResult<Json<Value>> {
    s.market.bundles.delete(&caller, id).await?;
    Ok(Json(json!({"message": "Bundle deleted"})))
}

async fn check_discount(State(s): State<AppState>, EntityId(id): EntityId) -> ApiResult<Json<DiscountCheck>> {
    Ok(Json(s.market.bundles.check_discount(id).await?))
}
