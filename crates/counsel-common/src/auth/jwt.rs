//! Bearer token validation
//!
//! Tokens are minted by the identity service; this side only checks the
//! HS256 signature and expiry and turns the claims into an [`Actor`].
//! [`JwtService::issue`] exists for local runs and tests.

use chrono::{Duration, Utc};
use counsel_core::{Actor, Role, Snowflake};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// # Errors
    /// Returns `InvalidToken` if the subject is not a Snowflake
    pub fn actor(&self) -> Result<Actor, AppError> {
        let id = Snowflake::parse(&self.sub).map_err(|_| AppError::InvalidToken)?;
        Ok(Actor::new(id, self.role))
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    #[must_use]
    pub fn new(secret: &str, leeway_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Decode and validate a bearer token
    ///
    /// # Errors
    /// `TokenExpired` for an expired token, `InvalidToken` for anything else
    pub fn validate(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })
    }

    /// Validate and resolve straight to the acting identity
    pub fn authenticate(&self, token: &str) -> Result<Actor, AppError> {
        self.validate(token)?.actor()
    }

    /// Mint a token for `actor` valid for `ttl`
    pub fn issue(&self, actor: Actor, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: actor.id.to_string(),
            role: actor.role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode JWT: {e}")))
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}
