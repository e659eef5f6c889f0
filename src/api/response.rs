use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ApiError;
use crate::util::date::now_instant;

/// Default envelope messages per outcome
pub mod messages {
    pub const SUCCESS: &str = "Success!";
    pub const CREATED: &str = "Created!";
    pub const BAD_REQUEST: &str = "Bad Request!";
    pub const UNAUTHORIZED: &str = "Unauthorized Access!";
    pub const NOT_FOUND: &str = "Endpoint Not Found!";
    pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error!";
    pub const UNEXPECTED: &str = "Unexpected Error Occurred";
}

/// Uniform JSON envelope: `{status, success, message, timestamp, data?}`.
///
/// `success` is fixed by the constructor from the status class and is never
/// set independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T = ()> {
    pub status: u16,
    pub success: bool,
    pub message: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Envelope returned by login endpoints, carrying the issued bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub status: u16,
    pub success: bool,
    pub message: String,
    pub timestamp: String,
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

/// What every service and controller operation returns
pub type ServiceResult<T = ()> = Result<ApiResponse<T>, ApiError>;

impl ApiResponse {
    /// 200 with the default success message
    pub fn ok() -> Self {
        Self::success(StatusCode::OK, messages::SUCCESS)
    }

    /// 201 with the default created message
    pub fn created() -> Self {
        Self::success(StatusCode::CREATED, messages::CREATED)
    }

    pub fn bad_request() -> Self {
        Self::failure(StatusCode::BAD_REQUEST, messages::BAD_REQUEST)
    }

    pub fn unauthorized() -> Self {
        Self::failure(StatusCode::UNAUTHORIZED, messages::UNAUTHORIZED)
    }

    pub fn not_found() -> Self {
        Self::failure(StatusCode::NOT_FOUND, messages::NOT_FOUND)
    }

    pub fn internal_server_error() -> Self {
        Self::failure(StatusCode::INTERNAL_SERVER_ERROR, messages::INTERNAL_SERVER_ERROR)
    }

    /// 500 echoing the error's message, or the default when there is no
    /// error or it renders empty
    pub fn internal_server_error_from(error: Option<&dyn std::error::Error>) -> Self {
        let message = error
            .map(|e| e.to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| messages::INTERNAL_SERVER_ERROR.to_string());

        Self::failure(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// 200 login envelope with the default message
    pub fn login(access_token: impl Into<String>) -> LoginResponse {
        Self::login_with_message(messages::SUCCESS, access_token)
    }

    pub fn login_with_message(message: impl Into<String>, access_token: impl Into<String>) -> LoginResponse {
        LoginResponse {
            status: StatusCode::OK.as_u16(),
            success: true,
            message: non_empty(message.into()),
            timestamp: now_instant(),
            access_token: access_token.into(),
        }
    }

    fn success(status: StatusCode, message: impl Into<String>) -> Self {
        Self::generate(true, status, message.into())
    }

    fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self::generate(false, status, message.into())
    }

    fn generate(success: bool, status: StatusCode, message: String) -> Self {
        Self {
            status: status.as_u16(),
            success,
            message: non_empty(message),
            timestamp: now_instant(),
            data: None,
        }
    }
}

impl<T> ApiResponse<T> {
    /// Arbitrary payload with an explicit status; `success` follows the status class
    pub fn body(data: T, status: StatusCode) -> Self {
        let success = status.as_u16() < 400;
        let message = if success {
            messages::SUCCESS.to_string()
        } else {
            status.canonical_reason().unwrap_or(messages::UNEXPECTED).to_string()
        };

        Self {
            status: status.as_u16(),
            success,
            message,
            timestamp: now_instant(),
            data: Some(data),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = non_empty(message.into());
        self
    }

    /// Attach a payload, keeping status and success untouched
    pub fn with_data<U>(self, data: U) -> ApiResponse<U> {
        ApiResponse {
            status: self.status,
            success: self.success,
            message: self.message,
            timestamp: self.timestamp,
            data: Some(data),
        }
    }

    /// Re-type an envelope, dropping any payload. Lets a service answer with
    /// e.g. `not_found()` where a typed result is expected.
    pub fn without_data<U>(self) -> ApiResponse<U> {
        ApiResponse {
            status: self.status,
            success: self.success,
            message: self.message,
            timestamp: self.timestamp,
            data: None,
        }
    }

    /// Transform the payload, keeping status and success untouched
    pub fn map_data<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            status: self.status,
            success: self.success,
            message: self.message,
            timestamp: self.timestamp,
            data: self.data.map(f),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

fn non_empty(message: String) -> String {
    if message.is_empty() {
        messages::UNEXPECTED.to_string()
    } else {
        message
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match serde_json::to_value(&self) {
            Ok(envelope) => (status, Json(envelope)).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                let fallback = ApiResponse::internal_server_error();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "status": fallback.status,
                        "success": fallback.success,
                        "message": fallback.message,
                        "timestamp": fallback.timestamp,
                    })),
                )
                    .into_response()
            }
        }
    }
}

impl IntoResponse for LoginResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}
