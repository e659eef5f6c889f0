//! Sample application assembled from the library pieces: a `notes` resource
//! behind the bearer filter plus a login endpoint. The binary serves it and
//! the integration tests drive it in-process.

pub mod login;
pub mod notes;

use std::sync::Arc;

use axum::{middleware, response::IntoResponse, routing::{get, post}, Router};

use crate::auth::{HmacTokenService, InMemoryUserDetailsService, TokenError, UserDetails};
use crate::config::AppConfig;
use crate::controller::CrudRouter;
use crate::database::{InMemoryRepository, Repository};
use crate::middleware::{authentication_filter, BearerAuthenticationFilter};
use crate::api::response::ApiResponse;

pub use login::{LoginRequest, LoginState};
pub use notes::{Note, NoteRequest, NoteService, NoteSummary, NoteValidator, CREATE_NOTES_TABLE};

pub type DemoFilter = BearerAuthenticationFilter<HmacTokenService, InMemoryUserDetailsService>;

/// A built-in account of the demo
#[derive(Debug, Clone, Copy)]
pub struct DemoAccount {
    pub id: i64,
    pub username: &'static str,
    pub password: &'static str,
    pub role: &'static str,
}

pub const ACCOUNTS: [DemoAccount; 2] = [
    DemoAccount {
        id: 1,
        username: "admin",
        password: "admin-password",
        role: "ADMIN",
    },
    DemoAccount {
        id: 2,
        username: "writer",
        password: "writer-password",
        role: "USER",
    },
];

pub fn account(username: &str) -> Option<&'static DemoAccount> {
    ACCOUNTS.iter().find(|a| a.username == username)
}

/// Build the demo router from configuration, keeping notes in memory
pub fn app(config: &AppConfig) -> Result<Router, TokenError> {
    app_with_repository(config, Arc::new(InMemoryRepository::<Note>::new()))
}

/// Build the demo router over the given note storage
pub fn app_with_repository(
    config: &AppConfig,
    repository: Arc<dyn Repository<Note, i64>>,
) -> Result<Router, TokenError> {
    let tokens = Arc::new(HmacTokenService::from_config(&config.security)?);
    let users = Arc::new(InMemoryUserDetailsService::new(
        ACCOUNTS
            .iter()
            .map(|a| UserDetails::new(a.username, a.password, &[a.role])),
    ));

    let filter: Arc<DemoFilter> = Arc::new(BearerAuthenticationFilter::new(tokens.clone(), users.clone()));
    let notes = Arc::new(NoteService::new(repository));

    let router = Router::new()
        .route("/auth/login", post(login::login))
        .with_state(LoginState { tokens, users })
        .route("/health", get(health))
        .nest(
            "/api/notes",
            CrudRouter::<NoteService, i64, NoteRequest>::with_pagination(notes, config.pagination.clone())
                .crud()
                .projection()
                .page()
                .into_router(),
        )
        .layer(middleware::from_fn_with_state(filter, authentication_filter::<DemoFilter>));

    Ok(router)
}

async fn health() -> impl IntoResponse {
    ApiResponse::ok().with_data(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
