//! JWT issue and validation for access and password-reset tokens.
//!
//! Both token kinds are HS256-signed with the same process-wide secret and carry
//! no purpose claim, so they differ only in claim shape. A reset token is accepted
//! anywhere only signature and expiry are checked.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Claim set of an access token: whatever the caller supplied plus `exp`.
pub type ClaimSet = Map<String, Value>;

pub const DEFAULT_ACCESS_TOKEN_TTL_MINUTES: i64 = 15;
pub const DEFAULT_RESET_TOKEN_TTL_MINUTES: i64 = 60;

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetClaims {
    pub sub: String, // email
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Issues and verifies signed, time-limited tokens with one shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation
    }

    fn expires_at(ttl: Duration) -> i64 {
        (Utc::now() + ttl).timestamp()
    }

    /// Sign `claims` with an `exp` of now + `ttl`. An `exp` supplied by the caller is replaced.
    pub fn issue_access_token(&self, claims: &ClaimSet, ttl: Duration) -> Result<String, TokenError> {
        let mut to_encode = claims.clone();
        to_encode.insert("exp".to_string(), Value::from(Self::expires_at(ttl)));
        encode(&Header::new(Algorithm::HS256), &to_encode, &self.encoding).map_err(TokenError::Sign)
    }

    /// [`issue_access_token`](Self::issue_access_token) with the 15 minute default TTL.
    pub fn issue_default_access_token(&self, claims: &ClaimSet) -> Result<String, TokenError> {
        self.issue_access_token(claims, Duration::minutes(DEFAULT_ACCESS_TOKEN_TTL_MINUTES))
    }

    /// Verify an access token and return its full claim set.
    pub fn decode_access_token(&self, token: &str) -> Result<ClaimSet, TokenError> {
        let data = decode::<ClaimSet>(token, &self.decoding, &Self::validation())
            .map_err(TokenError::Invalid)?;
        Ok(data.claims)
    }

    pub fn issue_reset_token(&self, email: &str, ttl: Duration) -> Result<String, TokenError> {
        let claims = ResetClaims {
            sub: email.to_string(),
            exp: Self::expires_at(ttl),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Sign)
    }

    /// Returns the email a valid, unexpired reset token was issued for.
    /// Bad signatures, malformed tokens and expired tokens all yield `None`.
    pub fn verify_reset_token(&self, token: &str) -> Option<String> {
        match decode::<ResetClaims>(token, &self.decoding, &Self::validation()) {
            Ok(data) => Some(data.claims.sub),
            Err(e) => {
                debug!(reason = ?e.kind(), "reset token rejected");
                None
            }
        }
    }
}
