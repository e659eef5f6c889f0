pub mod auth;

pub use auth::{authentication_filter, bearer_token, AuthenticationFilter, BearerAuthenticationFilter};
