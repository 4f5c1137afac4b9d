use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::{BranchId, TenantId};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MenuItem {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub category_id: Uuid,
    /// `None` means every branch serves the item
    pub branch_id: Option<BranchId>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub is_available: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

impl MenuItem {
    pub fn offered_at(&self, branch: Option<BranchId>) -> bool {
        match (self.branch_id, branch) {
            (None, _) => true,
            (Some(own), Some(requested)) => own == requested,
            (Some(_), None) => false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMenuItem {
    pub category_id: Uuid,
    pub branch_id: Option<BranchId>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    pub position: i32,
}

fn default_available() -> bool {
    true
}
