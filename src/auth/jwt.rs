use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Header, Validation};

use super::token::{Claims, SigningKey, TokenError, TokenService};
use crate::config::SecurityConfig;

/// HS256 token service backed by a shared secret.
///
/// `claims_from_token` verifies the signature (and issuer when configured)
/// but leaves expiry to [`TokenService::is_expired`], so callers can tell an
/// expired token apart from a forged one.
#[derive(Debug, Clone)]
pub struct HmacTokenService {
    key: SigningKey,
    expiry: Duration,
    issuer: Option<String>,
}

impl HmacTokenService {
    pub fn new(secret: &[u8], expiry: Duration) -> Self {
        Self {
            key: SigningKey::hmac(secret),
            expiry,
            issuer: None,
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, TokenError> {
        if config.jwt_secret.is_empty() {
            return Err(TokenError::Signing("JWT secret not configured".to_string()));
        }

        let expiry = i64::try_from(config.jwt_expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .filter(|expiry| Utc::now().checked_add_signed(*expiry).is_some())
            .ok_or_else(|| {
                TokenError::Signing(format!("JWT expiry of {} hours is out of range", config.jwt_expiry_hours))
            })?;
        let mut service = Self::new(config.jwt_secret.as_bytes(), expiry);
        service.issuer = config.jwt_issuer.clone();
        Ok(service)
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }
}

impl TokenService for HmacTokenService {
    fn setup_claims(&self, claims: &mut Claims, username: &str) {
        let now = Utc::now();
        claims.sub = Some(username.to_string());
        claims.iat = Some(now.timestamp());
        // Saturate instead of overflowing on absurd expiry windows
        let exp = now.checked_add_signed(self.expiry).unwrap_or(DateTime::<Utc>::MAX_UTC);
        claims.exp = Some(exp.timestamp());
        if let Some(issuer) = &self.issuer {
            claims.insert("iss", issuer.as_str());
        }
    }

    fn generate_access_token_with_claims(&self, mut claims: Claims, username: &str) -> Result<String, TokenError> {
        self.setup_claims(&mut claims, username);

        let key = self.signing_key();
        encode(&Header::new(key.algorithm), &claims, &key.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn claims_from_token(&self, token: &str) -> Result<Claims, TokenError> {
        let key = self.signing_key();

        let mut validation = Validation::new(key.algorithm);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "exp"]);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        decode::<Claims>(token, &key.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }

    fn signing_key(&self) -> &SigningKey {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> HmacTokenService {
        HmacTokenService::new(b"test-secret", Duration::hours(1))
    }

    #[test]
    fn test_issued_token_resolves_username() {
        let service = service();
        let token = service.generate_access_token("alice").unwrap();

        assert_eq!(service.get_username(&token).unwrap(), "alice");
        assert!(!service.is_expired(&token).unwrap());
    }

    #[test]
    fn test_custom_claims_survive() {
        let service = service();
        let claims = Claims::new().with("id", 7).with("role", "editor");
        let token = service.generate_access_token_with_claims(claims, "bob").unwrap();

        assert_eq!(service.get_id::<i64>(&token).unwrap(), 7);
        assert_eq!(service.get_role(&token).unwrap(), "editor");
    }

    #[test]
    fn test_expired_token_still_parses() {
        let service = HmacTokenService::new(b"test-secret", Duration::hours(-1));
        let token = service.generate_access_token("carol").unwrap();

        assert_eq!(service.get_username(&token).unwrap(), "carol");
        assert!(service.is_expired(&token).unwrap());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = service().generate_access_token("alice").unwrap();
        let other = HmacTokenService::new(b"other-secret", Duration::hours(1));

        assert!(matches!(other.get_username(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(service().get_username("not-a-jwt").is_err());
    }

    #[test]
    fn test_issuer_is_enforced() {
        let issuing = service().with_issuer("crud-base");
        let token = issuing.generate_access_token("alice").unwrap();

        assert_eq!(issuing.get_username(&token).unwrap(), "alice");
        assert!(service().with_issuer("someone-else").get_username(&token).is_err());
    }

    #[test]
    fn test_from_config_requires_secret() {
        let mut config = crate::config::AppConfig::preset(crate::config::Environment::Production).security;
        assert!(HmacTokenService::from_config(&config).is_err());

        config.jwt_secret = "s3cret".to_string();
        assert!(HmacTokenService::from_config(&config).is_ok());
    }

    #[test]
    fn test_from_config_rejects_unrepresentable_expiry() {
        let mut config = crate::config::AppConfig::preset(crate::config::Environment::Development).security;

        for hours in [3_000_000_000_000_000, 10_000_000_000, u64::MAX] {
            config.jwt_expiry_hours = hours;
            let err = HmacTokenService::from_config(&config).unwrap_err();
            assert!(matches!(err, TokenError::Signing(_)), "{} hours", hours);
        }
    }

    #[test]
    fn test_huge_expiry_saturates_instead_of_panicking() {
        let service = HmacTokenService::new(b"test-secret", Duration::MAX);
        let token = service.generate_access_token("dave").unwrap();

        assert_eq!(service.get_username(&token).unwrap(), "dave");
        assert!(!service.is_expired(&token).unwrap());
    }
}
