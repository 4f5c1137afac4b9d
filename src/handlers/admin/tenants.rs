use axum::{extract::State, Extension, Json};

use crate::app::AppState;
use crate::database::models::{NewTenant, Tenant};
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::services;

/// GET /api/admin/tenants
pub async fn list(State(state): State<AppState>, Extension(admin): Extension<AdminUser>) -> ApiResult<Vec<Tenant>> {
    admin.ensure_root()?;
    let tenants = state.store.list_tenants().await?;
    Ok(ApiResponse::list(tenants))
}

/// POST /api/admin/tenants
pub async fn create(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Json(request): Json<NewTenant>,
) -> ApiResult<Tenant> {
    admin.ensure_root()?;
    let tenant = services::create_tenant(state.store.as_ref(), request).await?;
    Ok(ApiResponse::created(tenant))
}
