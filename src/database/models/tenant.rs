use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::TenantId;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    /// Stored lower-case; unique
    pub subdomain: String,
    pub whatsapp_number: Option<String>,
    pub currency: String,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Active flag set and not past its expiry. The sweep flips the flag
    /// eventually; lookups must not wait for it.
    pub fn is_servable(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.map_or(true, |at| at > now)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTenant {
    pub name: String,
    pub subdomain: String,
    pub whatsapp_number: Option<String>,
    pub currency: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}
