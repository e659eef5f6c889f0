// API error taxonomy and the boundary translation into response envelopes
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::api::response::{messages, ApiResponse};

pub mod thrower;

pub use thrower::{exception, message, required, ExceptionThrower};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure raised by validators, services and the authentication filter.
///
/// Every variant is turned into an [`ApiResponse`] envelope by the
/// `IntoResponse` impl below; nothing else needs to know about HTTP.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 400: client supplied invalid data
    #[error("{0}")]
    BadRequest(String),

    /// 401: missing, invalid or expired credential
    #[error("{0}")]
    Unauthorized(String),

    /// 500: unclassified failure, usually wrapping a lower-level error
    #[error("{}", .message.as_deref().unwrap_or(messages::INTERNAL_SERVER_ERROR))]
    Api {
        message: Option<String>,
        #[source]
        source: Option<BoxError>,
    },

    /// 400: the request body could not be deserialized
    #[error("{0}")]
    UnreadableBody(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn api(message: impl Into<String>) -> Self {
        ApiError::Api {
            message: Some(message.into()),
            source: None,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) | ApiError::UnreadableBody(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Api { .. } => 500,
        }
    }

    /// Convert into the uniform response envelope
    pub fn to_response(&self) -> ApiResponse {
        match self {
            ApiError::Api { .. } => ApiResponse::internal_server_error_from(Some(self)),
            ApiError::BadRequest(msg) | ApiError::UnreadableBody(msg) => {
                ApiResponse::bad_request().with_message(msg.as_str())
            }
            ApiError::Unauthorized(msg) => ApiResponse::unauthorized().with_message(msg.as_str()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Api { source: Some(source), .. } => {
                tracing::error!("API failure: {} (caused by: {})", self, source);
            }
            ApiError::Api { .. } => tracing::error!("API failure: {}", self),
            _ => tracing::debug!("Request rejected with {}: {}", self.status_code(), self),
        }

        self.to_response().into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::UnreadableBody(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
