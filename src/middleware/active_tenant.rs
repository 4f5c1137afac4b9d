use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::Utc;

use crate::app::AppState;
use crate::database::models::Tenant;
use crate::error::ApiError;
use crate::tenancy::{first_segment, TenantKey};

/// The tenant addressed by this request, looked up and verified servable.
///
/// The key comes from the `TenantKey` extension left by the resolver, or,
/// for requests that reached the router positionally (local development,
/// root domain), from the first path segment.
#[derive(Debug, Clone)]
pub struct ActiveTenant(pub Tenant);

#[async_trait]
impl FromRequestParts<AppState> for ActiveTenant {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let key = match parts.extensions.get::<TenantKey>() {
            Some(key) => key.clone(),
            None => first_segment(parts.uri.path())
                .and_then(TenantKey::parse)
                .ok_or_else(|| ApiError::not_found("Restaurant not found"))?,
        };

        let tenant = state
            .store
            .find_tenant_by_subdomain(key.as_str())
            .await?
            .filter(|tenant| tenant.is_servable(Utc::now()))
            .ok_or_else(|| {
                tracing::debug!(tenant = %key, "unknown or inactive tenant");
                ApiError::not_found(format!("Restaurant '{}' not found", key))
            })?;

        Ok(ActiveTenant(tenant))
    }
}
