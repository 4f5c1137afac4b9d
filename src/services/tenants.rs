use thiserror::Error;

use crate::database::models::{NewTenant, Tenant};
use crate::database::{StoreError, TenantStore};
use crate::error::ApiError;
use crate::tenancy::key::is_dns_label;

pub const MIN_SUBDOMAIN_LEN: usize = 3;

/// Labels that belong to the platform itself
pub const RESERVED_SUBDOMAINS: &[&str] = &["www", "api", "admin", "app", "mail", "static", "assets"];

#[derive(Debug, Error)]
pub enum TenantError {
    #[error("Invalid subdomain: {0}")]
    InvalidSubdomain(String),
    #[error("Invalid tenant: {0}")]
    Invalid(String),
    #[error("Subdomain already taken: {0}")]
    AlreadyExists(String),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for TenantError {
    fn from(err: StoreError) -> Self {
        TenantError::Store(err)
    }
}

impl From<TenantError> for ApiError {
    fn from(err: TenantError) -> Self {
        match err {
            TenantError::InvalidSubdomain(msg) => ApiError::field_error("subdomain", msg),
            TenantError::Invalid(msg) => ApiError::bad_request(msg),
            TenantError::AlreadyExists(sub) => ApiError::conflict(format!("Subdomain '{}' is already taken", sub)),
            TenantError::Store(e) => e.into(),
        }
    }
}

/// Lower-case and validate a subdomain requested for a new tenant
pub fn normalize_subdomain(raw: &str) -> Result<String, TenantError> {
    let subdomain = raw.trim().to_ascii_lowercase();
    if subdomain.len() < MIN_SUBDOMAIN_LEN {
        return Err(TenantError::InvalidSubdomain(format!(
            "must be at least {} characters",
            MIN_SUBDOMAIN_LEN
        )));
    }
    if !is_dns_label(&subdomain) {
        return Err(TenantError::InvalidSubdomain(
            "only letters, digits and inner hyphens are allowed (max 63)".to_string(),
        ));
    }
    if RESERVED_SUBDOMAINS.contains(&subdomain.as_str()) {
        return Err(TenantError::InvalidSubdomain(format!("'{}' is reserved", subdomain)));
    }
    Ok(subdomain)
}

/// Create a restaurant with a normalized, unique subdomain
pub async fn create_tenant(store: &dyn TenantStore, mut request: NewTenant) -> Result<Tenant, TenantError> {
    request.name = request.name.trim().to_string();
    if request.name.is_empty() {
        return Err(TenantError::Invalid("name is required".to_string()));
    }
    request.subdomain = normalize_subdomain(&request.subdomain)?;
    if let Some(currency) = request.currency.as_mut() {
        *currency = currency.trim().to_ascii_uppercase();
        if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(TenantError::Invalid("currency must be a 3-letter ISO code".to_string()));
        }
    }

    if store.find_tenant_by_subdomain(&request.subdomain).await?.is_some() {
        return Err(TenantError::AlreadyExists(request.subdomain));
    }

    let subdomain = request.subdomain.clone();
    let tenant = store.create_tenant(request).await.map_err(|e| match e {
        // lost a race with a concurrent create
        StoreError::Conflict(_) => TenantError::AlreadyExists(subdomain),
        other => other.into(),
    })?;

    tracing::info!(tenant = %tenant.id, subdomain = %tenant.subdomain, "tenant created");
    Ok(tenant)
}
