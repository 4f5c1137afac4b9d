use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::{BranchId, TenantId};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Branch {
    pub id: BranchId,
    pub tenant_id: TenantId,
    pub name: String,
    pub city: String,
    /// Delivery areas served by this branch
    pub areas: Vec<String>,
    pub delivery_fee: Decimal,
    pub whatsapp_number: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Branch {
    pub fn serves_area(&self, area: &str) -> bool {
        let area = area.trim();
        !area.is_empty() && self.areas.iter().any(|a| a.trim().eq_ignore_ascii_case(area))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBranch {
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub areas: Vec<String>,
    #[serde(default)]
    pub delivery_fee: Decimal,
    pub whatsapp_number: Option<String>,
}
