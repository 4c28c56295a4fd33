//! Bearer identity token extractor.
//!
//! The token carries the full identity record, so extraction never touches
//! the database.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::{UserIdentity, UserRole};
use shared::jwt::{IdentityClaims, JwtConfig, JwtError};

use crate::app::AppState;
use crate::error::ApiError;

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserIdentity);

impl AuthenticatedUser {
    pub fn identity(&self) -> &UserIdentity {
        &self.0
    }
}

impl TryFrom<IdentityClaims> for AuthenticatedUser {
    type Error = ApiError;

    fn try_from(claims: IdentityClaims) -> Result<Self, Self::Error> {
        let role: UserRole = claims
            .role
            .parse()
            .map_err(|_| ApiError::Unauthorized("Token carries an unknown role".to_string()))?;

        Ok(Self(UserIdentity {
            user_id: claims.sub,
            email: claims.email,
            username: claims.username,
            first_name: claims.first_name,
            last_name: claims.last_name,
            role,
            phone: claims.phone,
        }))
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let jwt = &state.config.jwt;
        let jwt_config = JwtConfig::with_leeway(
            &jwt.private_key,
            &jwt.public_key,
            jwt.access_token_expiry_secs,
            jwt.leeway_secs,
        )
        .map_err(|e| ApiError::Internal(format!("JWT configuration error: {}", e)))?;

        let claims = jwt_config
            .validate_identity_token(token)
            .map_err(|e| match e {
                JwtError::TokenExpired => ApiError::Unauthorized("Token has expired".to_string()),
                _ => ApiError::Unauthorized("Invalid or expired token".to_string()),
            })?;

        claims.try_into()
    }
}
