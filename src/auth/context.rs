use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;

use async_trait::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::api::response::messages;
use crate::error::ApiError;

/// Account data needed to build an [`Authentication`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserDetails {
    pub username: String,
    pub password: String,
    pub authorities: Vec<String>,
}

impl UserDetails {
    pub fn new(username: impl Into<String>, password: impl Into<String>, authorities: &[&str]) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            authorities: authorities.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Principal lookup by username
#[async_trait]
pub trait UserDetailsService: Send + Sync {
    async fn load_user_by_username(&self, username: &str) -> Result<UserDetails, ApiError>;
}

/// Map-backed user lookup, for tests and small deployments
#[derive(Default)]
pub struct InMemoryUserDetailsService {
    users: RwLock<HashMap<String, UserDetails>>,
}

impl InMemoryUserDetailsService {
    pub fn new(users: impl IntoIterator<Item = UserDetails>) -> Self {
        let users = users
            .into_iter()
            .map(|user| (user.username.clone(), user))
            .collect();
        Self { users: RwLock::new(users) }
    }

    pub async fn insert(&self, user: UserDetails) {
        self.users.write().await.insert(user.username.clone(), user);
    }
}

#[async_trait]
impl UserDetailsService for InMemoryUserDetailsService {
    async fn load_user_by_username(&self, username: &str) -> Result<UserDetails, ApiError> {
        self.users
            .read()
            .await
            .get(username)
            .cloned()
            .ok_or_else(|| ApiError::unauthorized(format!("User '{}' not found", username)))
    }
}

/// Request metadata attached to an authentication
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AuthenticationDetails {
    pub remote_address: Option<String>,
    pub method: String,
    pub path: String,
}

impl AuthenticationDetails {
    pub fn from_parts(parts: &Parts) -> Self {
        Self {
            remote_address: parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string()),
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
        }
    }
}

/// An authenticated principal
#[derive(Clone, Debug, Serialize)]
pub struct Authentication {
    pub principal: String,
    #[serde(skip)]
    pub credentials: String,
    pub authorities: Vec<String>,
    pub details: AuthenticationDetails,
}

impl Authentication {
    pub fn new(user: UserDetails, details: AuthenticationDetails) -> Self {
        Self {
            principal: user.username,
            credentials: user.password,
            authorities: user.authorities,
            details,
        }
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }
}

/// Request-scoped authentication state.
///
/// Stored in request extensions by the authentication filter and extracted
/// by handlers, which pass it on to services explicitly.
#[derive(Clone, Debug, Default)]
pub struct SecurityContext {
    pub authentication: Option<Authentication>,
}

impl SecurityContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(authentication: Authentication) -> Self {
        Self {
            authentication: Some(authentication),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authentication.is_some()
    }

    pub fn principal(&self) -> Option<&str> {
        self.authentication.as_ref().map(|a| a.principal.as_str())
    }

    /// The authentication, or a 401 when the request is anonymous
    pub fn require(&self) -> Result<&Authentication, ApiError> {
        self.authentication
            .as_ref()
            .ok_or_else(|| ApiError::unauthorized(messages::UNAUTHORIZED))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SecurityContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<SecurityContext>().cloned().unwrap_or_default())
    }
}
