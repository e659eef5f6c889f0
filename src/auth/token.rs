use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const ID_CLAIM: &str = "id";
pub const ROLE_CLAIM: &str = "role";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Missing claim: {0}")]
    MissingClaim(String),

    #[error("Invalid claim '{name}': {reason}")]
    InvalidClaim { name: String, reason: String },

    #[error("Token signing error: {0}")]
    Signing(String),
}

/// Token payload: the registered claims used here plus any custom ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a custom claim
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.custom.insert(name.into(), value.into());
    }

    pub fn subject(&self) -> Result<&str, TokenError> {
        self.sub
            .as_deref()
            .ok_or_else(|| TokenError::MissingClaim("sub".to_string()))
    }

    pub fn expiration(&self) -> Result<DateTime<Utc>, TokenError> {
        let exp = self.exp.ok_or_else(|| TokenError::MissingClaim("exp".to_string()))?;
        DateTime::<Utc>::from_timestamp(exp, 0).ok_or_else(|| TokenError::InvalidClaim {
            name: "exp".to_string(),
            reason: format!("{} is out of range", exp),
        })
    }

    /// Read a custom claim as `T`
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, TokenError> {
        let value = self
            .custom
            .get(name)
            .ok_or_else(|| TokenError::MissingClaim(name.to_string()))?;

        serde_json::from_value(value.clone()).map_err(|e| TokenError::InvalidClaim {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Key material used to sign and verify tokens.
#[derive(Clone)]
pub struct SigningKey {
    pub algorithm: Algorithm,
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl SigningKey {
    /// Shared-secret HMAC key (HS256)
    pub fn hmac(secret: &[u8]) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Bearer token issuing and inspection.
///
/// Implementors decide how claims are populated, signed and verified; the
/// claim lookups on top are provided. Every lookup fails with a [`TokenError`]
/// when the token cannot be parsed or verified.
pub trait TokenService: Send + Sync {
    /// Fill in the claims every issued token carries
    fn setup_claims(&self, claims: &mut Claims, username: &str);

    /// Produce a signed token for `username` carrying the given extra claims
    fn generate_access_token_with_claims(&self, claims: Claims, username: &str) -> Result<String, TokenError>;

    /// Parse and verify a token
    fn claims_from_token(&self, token: &str) -> Result<Claims, TokenError>;

    fn signing_key(&self) -> &SigningKey;

    /// True when the expiration claim lies strictly before now
    fn is_expired(&self, token: &str) -> Result<bool, TokenError> {
        let expiration = self.claims_from_token(token)?.expiration()?;
        Ok(expiration < Utc::now())
    }

    fn get_id<I: DeserializeOwned>(&self, token: &str) -> Result<I, TokenError>
    where
        Self: Sized,
    {
        self.claims_from_token(token)?.get(ID_CLAIM)
    }

    fn get_role(&self, token: &str) -> Result<String, TokenError> {
        self.claims_from_token(token)?.get(ROLE_CLAIM)
    }

    fn get_username(&self, token: &str) -> Result<String, TokenError> {
        Ok(self.claims_from_token(token)?.subject()?.to_string())
    }

    fn generate_access_token(&self, username: &str) -> Result<String, TokenError> {
        self.generate_access_token_with_claims(Claims::new(), username)
    }
}
