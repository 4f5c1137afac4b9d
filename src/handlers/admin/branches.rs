use axum::{
    extract::{Path, State},
    Extension, Json,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Branch, NewBranch};
use crate::error::ApiError;
use crate::middleware::{AdminUser, ApiResponse, ApiResult};

use super::managed_tenant;

/// GET /api/admin/tenants/:id/branches
pub async fn list(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<Branch>> {
    let tenant = managed_tenant(&state, &admin, id).await?;
    Ok(ApiResponse::list(state.store.list_branches(tenant.id).await?))
}

/// POST /api/admin/tenants/:id/branches
pub async fn create(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<Uuid>,
    Json(mut request): Json<NewBranch>,
) -> ApiResult<Branch> {
    let tenant = managed_tenant(&state, &admin, id).await?;

    request.name = request.name.trim().to_string();
    if request.name.is_empty() {
        return Err(ApiError::field_error("name", "is required"));
    }
    if request.delivery_fee < Decimal::ZERO {
        return Err(ApiError::field_error("delivery_fee", "must not be negative"));
    }
    request.city = request.city.trim().to_string();
    request.areas = request
        .areas
        .iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();

    let branch = state.store.create_branch(tenant.id, request).await?;
    tracing::info!(tenant = %tenant.id, branch = %branch.id, "branch created");
    Ok(ApiResponse::created(branch))
}
