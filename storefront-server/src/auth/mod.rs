//! Thin JWT authentication
//!
//! The storefront only needs to resolve an optional user id from a bearer
//! token. A missing token means guest checkout; a present-but-invalid token
//! is rejected.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use shared::error::AppError;

use crate::core::ServerState;

/// JWT claims carried in storefront tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (subject)
    pub sub: String,
    /// Expiration timestamp (seconds)
    pub exp: i64,
    /// Issued-at timestamp (seconds)
    pub iat: i64,
}

/// The authenticated user resolved from a bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
}

/// Token issue/verify service
#[derive(Debug, Clone)]
pub struct JwtService {
    secret: String,
}

impl JwtService {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Issue a token for a user id (used by the auth collaborator and tests)
    pub fn issue(&self, user_id: &str, ttl_minutes: i64) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(ttl_minutes)).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::internal(format!("failed to issue token: {e}")))
    }

    /// Verify a token and return the user it names
    pub fn verify(&self, token: &str) -> Result<CurrentUser, AppError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AppError::invalid_token(format!("invalid token: {e}")))?;

        Ok(CurrentUser {
            id: data.claims.sub,
        })
    }
}

/// Extractor resolving an optional authenticated user
///
/// - No `Authorization` header → guest (`MaybeUser(None)`)
/// - `Bearer <token>` with a valid token → `MaybeUser(Some(user))`
/// - Malformed or expired token → 401
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

impl FromRequestParts<ServerState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(http::header::AUTHORIZATION) else {
            return Ok(MaybeUser(None));
        };

        let value = header
            .to_str()
            .map_err(|_| AppError::invalid_token("malformed Authorization header"))?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::invalid_token("expected Bearer token"))?;

        let user = state.jwt.verify(token)?;
        Ok(MaybeUser(Some(user)))
    }
}
