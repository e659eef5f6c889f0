use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;

use crate::auth::{
    Authentication, AuthenticationDetails, SecurityContext, TokenService, UserDetailsService,
};
use crate::error::ApiError;

pub const BEARER_PREFIX: &str = "Bearer ";
pub const TOKEN_MISSING: &str = "Valid JSON web token is missing";
pub const TOKEN_EXPIRED: &str = "Token has been expired";

/// Extract the bearer token from the `Authorization` header.
///
/// Returns `None` when the header is absent, not valid visible ASCII, not
/// `Bearer`-prefixed, or carries nothing after the prefix.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
        .filter(|token| !token.is_empty())
}

/// Per-request bearer authentication.
///
/// `authenticate` turns a bearer token into an [`Authentication`];
/// `do_filter` is the hook that hands the request to the rest of the chain.
#[async_trait]
pub trait AuthenticationFilter: Send + Sync + 'static {
    type Tokens: TokenService;
    type Users: UserDetailsService;

    fn token_service(&self) -> &Self::Tokens;

    fn user_details_service(&self) -> &Self::Users;

    /// Resolve the request's principal.
    ///
    /// `Ok(None)` means the request proceeds as it is: either no bearer token
    /// was sent or the context is already authenticated.
    async fn authenticate(
        &self,
        headers: &HeaderMap,
        context: &SecurityContext,
        details: AuthenticationDetails,
    ) -> Result<Option<Authentication>, ApiError> {
        let Some(token) = bearer_token(headers) else {
            return Ok(None);
        };

        let username = self.token_service().get_username(token).map_err(|e| {
            tracing::warn!("Rejected bearer token: {}", e);
            ApiError::unauthorized(TOKEN_MISSING)
        })?;

        if context.is_authenticated() {
            return Ok(None);
        }

        let user = self.user_details_service().load_user_by_username(&username).await?;

        let expired = self.token_service().is_expired(token).map_err(|e| {
            tracing::warn!("Rejected bearer token for '{}': {}", username, e);
            ApiError::unauthorized(TOKEN_MISSING)
        })?;
        if expired {
            tracing::warn!("Expired bearer token for '{}'", username);
            return Err(ApiError::unauthorized(TOKEN_EXPIRED));
        }

        tracing::debug!("Authenticated '{}' for {} {}", user.username, details.method, details.path);
        Ok(Some(Authentication::new(user, details)))
    }

    /// Continue with the rest of the chain
    fn do_filter(&self, request: Request, next: Next) -> BoxFuture<'static, Response>;
}

/// Stock filter over a token service and a user lookup
pub struct BearerAuthenticationFilter<T, U> {
    tokens: Arc<T>,
    users: Arc<U>,
}

impl<T, U> BearerAuthenticationFilter<T, U> {
    pub fn new(tokens: Arc<T>, users: Arc<U>) -> Self {
        Self { tokens, users }
    }
}

impl<T, U> AuthenticationFilter for BearerAuthenticationFilter<T, U>
where
    T: TokenService + 'static,
    U: UserDetailsService + 'static,
{
    type Tokens = T;
    type Users = U;

    fn token_service(&self) -> &T {
        &self.tokens
    }

    fn user_details_service(&self) -> &U {
        &self.users
    }

    fn do_filter(&self, request: Request, next: Next) -> BoxFuture<'static, Response> {
        Box::pin(next.run(request))
    }
}

/// Axum middleware running an [`AuthenticationFilter`].
///
/// ```ignore
/// router.layer(axum::middleware::from_fn_with_state(filter, authentication_filter::<MyFilter>))
/// ```
///
/// On success the resulting [`SecurityContext`] is stored in the request
/// extensions; any failure ends the request with the 401 envelope.
pub async fn authentication_filter<F: AuthenticationFilter>(
    State(filter): State<Arc<F>>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let context = parts.extensions.get::<SecurityContext>().cloned().unwrap_or_default();
    let details = AuthenticationDetails::from_parts(&parts);

    match filter.authenticate(&parts.headers, &context, details).await {
        Ok(Some(authentication)) => {
            parts.extensions.insert(SecurityContext::authenticated(authentication));
        }
        Ok(None) => {}
        Err(e) => return e.into_response(),
    }

    filter.do_filter(Request::from_parts(parts, body), next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Claims, InMemoryUserDetailsService, SigningKey, TokenError, UserDetails};
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedTokens {
        key: SigningKey,
        tokens: HashMap<String, Claims>,
    }

    impl TokenService for FixedTokens {
        fn setup_claims(&self, claims: &mut Claims, username: &str) {
            claims.sub = Some(username.to_string());
        }

        fn generate_access_token_with_claims(&self, _claims: Claims, username: &str) -> Result<String, TokenError> {
            Ok(username.to_string())
        }

        fn claims_from_token(&self, token: &str) -> Result<Claims, TokenError> {
            self.tokens
                .get(token)
                .cloned()
                .ok_or_else(|| TokenError::Invalid(token.to_string()))
        }

        fn signing_key(&self) -> &SigningKey {
            &self.key
        }
    }

    /// Counts user lookups so tests can tell whether authentication was attempted
    struct CountingUsers {
        inner: InMemoryUserDetailsService,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl UserDetailsService for CountingUsers {
        async fn load_user_by_username(&self, username: &str) -> Result<crate::auth::UserDetails, ApiError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.load_user_by_username(username).await
        }
    }

    fn filter() -> BearerAuthenticationFilter<FixedTokens, CountingUsers> {
        let now = Utc::now().timestamp();
        let claims = |sub: &str, exp: i64| Claims {
            sub: Some(sub.to_string()),
            exp: Some(exp),
            ..Claims::default()
        };

        let mut tokens = HashMap::new();
        tokens.insert("good".to_string(), claims("alice", now + 600));
        tokens.insert("old".to_string(), claims("alice", now - 600));

        BearerAuthenticationFilter::new(
            Arc::new(FixedTokens {
                key: SigningKey::hmac(b"k"),
                tokens,
            }),
            Arc::new(CountingUsers {
                inner: InMemoryUserDetailsService::new([UserDetails::new("alice", "pw", &["USER"])]),
                lookups: AtomicUsize::new(0),
            }),
        )
    }

    fn headers(authorization: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = authorization {
            headers.insert(AUTHORIZATION, value.parse().unwrap());
        }
        headers
    }

    async fn run(
        filter: &BearerAuthenticationFilter<FixedTokens, CountingUsers>,
        authorization: Option<&str>,
    ) -> Result<Option<Authentication>, ApiError> {
        filter
            .authenticate(&headers(authorization), &SecurityContext::anonymous(), AuthenticationDetails::default())
            .await
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers(Some("Bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&headers(Some("Bearer "))), None);
        assert_eq!(bearer_token(&headers(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&headers(Some("bearer abc"))), None);
        assert_eq!(bearer_token(&headers(None)), None);
    }

    #[tokio::test]
    async fn test_missing_or_empty_header_skips_authentication() {
        let filter = filter();
        assert!(run(&filter, None).await.unwrap().is_none());
        assert!(run(&filter, Some("Bearer ")).await.unwrap().is_none());
        assert_eq!(filter.users.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_token_authenticates() {
        let filter = filter();
        let auth = run(&filter, Some("Bearer good")).await.unwrap().unwrap();
        assert_eq!(auth.principal, "alice");
        assert_eq!(auth.credentials, "pw");
        assert_eq!(auth.authorities, vec!["USER"]);
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let err = run(&filter(), Some("Bearer old")).await.unwrap_err();
        assert!(matches!(&err, ApiError::Unauthorized(msg) if msg == TOKEN_EXPIRED));
    }

    #[tokio::test]
    async fn test_unparseable_token_is_rejected() {
        let filter = filter();
        let err = run(&filter, Some("Bearer forged")).await.unwrap_err();
        assert!(matches!(&err, ApiError::Unauthorized(msg) if msg == TOKEN_MISSING));
        assert_eq!(filter.users.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_existing_authentication_is_kept() {
        let filter = filter();
        let existing = Authentication::new(UserDetails::new("bob", "pw", &[]), AuthenticationDetails::default());
        let result = filter
            .authenticate(
                &headers(Some("Bearer good")),
                &SecurityContext::authenticated(existing),
                AuthenticationDetails::default(),
            )
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(filter.users.lookups.load(Ordering::SeqCst), 0);
    }
}
