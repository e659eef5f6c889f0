use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON request body whose parse failures become [`ApiError::UnreadableBody`]
/// and therefore render as the standard 400 envelope.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(value))
    }
}

/// Single `{id}` path segment, rejected as a bad request when it does not parse.
#[derive(Debug, Clone)]
pub struct IdPath<I>(pub I);

#[async_trait]
impl<I, S> FromRequestParts<S> for IdPath<I>
where
    I: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<I>::from_request_parts(parts, state).await?;
        Ok(IdPath(id))
    }
}
