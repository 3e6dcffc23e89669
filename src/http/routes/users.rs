use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::auth::Caller;
use crate::domain::aggregates::{Credentials, Registration, User};
use crate::http::error::ApiResult;
use crate::http::extract::JsonBody;
use crate::http::AppState;
use crate::services::LoginResponse;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

async fn register(State(s): State<AppState>, JsonBody(body): JsonBody<Registration>) -> ApiResult<(StatusCode, Json<User>)> {
    let user = s.market.users.register(body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn login(State(s): State<AppState>, JsonBody(body): JsonBody<Credentials>) -> ApiResult<Json<LoginResponse>> {
    Ok(Json(s.market.users.login(body).await?))
}

async fn me(caller: Caller) -> Json<Caller> { Json(caller) }
