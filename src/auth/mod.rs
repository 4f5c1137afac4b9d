use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::types::TenantId;

/// Administrative access level carried in the token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    /// Platform operator: every tenant
    Root,
    /// Restaurant owner: exactly one tenant
    Owner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: AdminRole,
    pub tenant_id: Option<TenantId>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: impl Into<String>, role: AdminRole, tenant_id: Option<TenantId>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        Self {
            sub: sub.into(),
            role,
            tenant_id,
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT secret not configured")]
    InvalidSecret,
    #[error("owner tokens must name a tenant")]
    MissingTenant,
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT token: {0}")]
    Invalid(String),
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }
    if claims.role == AdminRole::Owner && claims.tenant_id.is_none() {
        return Err(JwtError::MissingTenant);
    }

    encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| JwtError::Invalid(e.to_string()))?;

    let claims = token_data.claims;
    if claims.role == AdminRole::Owner && claims.tenant_id.is_none() {
        return Err(JwtError::MissingTenant);
    }
    Ok(claims)
}
