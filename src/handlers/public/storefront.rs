use axum::extract::State;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::app::AppState;
use crate::database::models::Branch;
use crate::middleware::{ActiveTenant, ApiResponse, ApiResult};
use crate::types::BranchId;

#[derive(Debug, Serialize)]
pub struct Storefront {
    pub name: String,
    pub subdomain: String,
    pub currency: String,
    pub whatsapp_number: Option<String>,
    pub branches: Vec<BranchSummary>,
}

/// Customer-facing branch view
#[derive(Debug, Serialize)]
pub struct BranchSummary {
    pub id: BranchId,
    pub name: String,
    pub city: String,
    pub areas: Vec<String>,
    pub delivery_fee: Decimal,
}

impl From<Branch> for BranchSummary {
    fn from(branch: Branch) -> Self {
        Self {
            id: branch.id,
            name: branch.name,
            city: branch.city,
            areas: branch.areas,
            delivery_fee: branch.delivery_fee,
        }
    }
}

/// GET /:subdomain - restaurant landing data
pub async fn storefront(State(state): State<AppState>, ActiveTenant(tenant): ActiveTenant) -> ApiResult<Storefront> {
    let branches = active_branches(&state, &tenant).await?;
    Ok(ApiResponse::success(Storefront {
        name: tenant.name,
        subdomain: tenant.subdomain,
        currency: tenant.currency,
        whatsapp_number: tenant.whatsapp_number,
        branches,
    }))
}

/// GET /:subdomain/branches
pub async fn branches(
    State(state): State<AppState>,
    ActiveTenant(tenant): ActiveTenant,
) -> ApiResult<Vec<BranchSummary>> {
    Ok(ApiResponse::list(active_branches(&state, &tenant).await?))
}

async fn active_branches(
    state: &AppState,
    tenant: &crate::database::models::Tenant,
) -> Result<Vec<BranchSummary>, crate::error::ApiError> {
    Ok(state
        .store
        .list_branches(tenant.id)
        .await?
        .into_iter()
        .filter(|b| b.is_active)
        .map(BranchSummary::from)
        .collect())
}
