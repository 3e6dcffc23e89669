//! Request extractors: bearer-token identity, ids and JSON bodies.

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::error::ApiError;
use super::AppState;
use crate::auth::token::extract_bearer_token;
use crate::auth::Caller;
use crate::MarketError;

pub const NO_TOKEN: &str = "No token, authorization denied";

fn caller_from_parts(parts: &Parts, state: &AppState) -> Result<Option<Caller>, ApiError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let token = header
        .to_str()
        .ok()
        .and_then(extract_bearer_token)
        .ok_or_else(|| MarketError::Authentication(NO_TOKEN.to_string()))?;
    let claims = state.jwt.validate(token)?;
    Ok(Some(Caller::from(claims)))
}

/// Requires a valid bearer token.
#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        caller_from_parts(parts, state)?
            .ok_or_else(|| MarketError::Authentication(NO_TOKEN.to_string()).into())
    }
}

/// Identity on public routes: absent header is anonymous, a bad token is still rejected.
pub struct MaybeCaller(pub Option<Caller>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeCaller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        caller_from_parts(parts, state).map(MaybeCaller)
    }
}

/// `:id` path segment parsed as a UUID.
pub struct EntityId(pub Uuid);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for EntityId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<Uuid>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(EntityId(id)),
            Err(_) => Err(MarketError::validation("Invalid id").into()),
        }
    }
}

/// JSON body whose rejections use the API error format.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(MarketError::validation(rejection.body_text()).into()),
        }
    }
}
