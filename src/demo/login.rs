use std::sync::Arc;

use axum::extract::State;
use serde::Deserialize;

use crate::api::extract::JsonBody;
use crate::api::response::{ApiResponse, LoginResponse};
use crate::auth::token::{ID_CLAIM, ROLE_CLAIM};
use crate::auth::{Claims, HmacTokenService, InMemoryUserDetailsService, TokenService, UserDetailsService};
use crate::error::{self, ApiError};

const BAD_CREDENTIALS: &str = "Invalid username or password";

#[derive(Clone)]
pub struct LoginState {
    pub tokens: Arc<HmacTokenService>,
    pub users: Arc<InMemoryUserDetailsService>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// POST /auth/login - exchange demo credentials for a bearer token
pub async fn login(
    State(state): State<LoginState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<LoginResponse, ApiError> {
    let username = body
        .username
        .filter(|u| !u.is_empty())
        .ok_or_else(|| error::required("username"))?;
    let password = body
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| error::required("password"))?;

    let user = state
        .users
        .load_user_by_username(&username)
        .await
        .map_err(|_| ApiError::unauthorized(BAD_CREDENTIALS))?;
    // Demo accounts keep plain passwords
    if user.password != password {
        tracing::warn!("Failed login for '{}'", username);
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    let account = super::account(&username).ok_or_else(|| ApiError::unauthorized(BAD_CREDENTIALS))?;
    let claims = Claims::new()
        .with(ID_CLAIM, account.id)
        .with(ROLE_CLAIM, account.role);
    let token = state
        .tokens
        .generate_access_token_with_claims(claims, &username)
        .map_err(error::exception)?;

    tracing::info!("Issued access token for '{}'", username);
    Ok(ApiResponse::login(token))
}
