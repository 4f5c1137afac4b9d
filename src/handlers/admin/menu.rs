use axum::{
    extract::{Path, State},
    Extension, Json,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Category, MenuItem, NewCategory, NewMenuItem};
use crate::error::ApiError;
use crate::middleware::{AdminUser, ApiResponse, ApiResult};

use super::managed_tenant;

/// GET /api/admin/tenants/:id/categories
pub async fn list_categories(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<Category>> {
    let tenant = managed_tenant(&state, &admin, id).await?;
    Ok(ApiResponse::list(state.store.list_categories(tenant.id).await?))
}

/// POST /api/admin/tenants/:id/categories
pub async fn create_category(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<Uuid>,
    Json(mut request): Json<NewCategory>,
) -> ApiResult<Category> {
    let tenant = managed_tenant(&state, &admin, id).await?;
    request.name = request.name.trim().to_string();
    if request.name.is_empty() {
        return Err(ApiError::field_error("name", "is required"));
    }
    let category = state.store.create_category(tenant.id, request).await?;
    Ok(ApiResponse::created(category))
}

/// GET /api/admin/tenants/:id/items - includes unavailable items
pub async fn list_items(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<MenuItem>> {
    let tenant = managed_tenant(&state, &admin, id).await?;
    Ok(ApiResponse::list(state.store.list_menu_items(tenant.id, None).await?))
}

/// POST /api/admin/tenants/:id/items
///
/// The category (and branch, when given) must belong to the same restaurant;
/// the store rejects foreign references with `NotFound`.
pub async fn create_item(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<Uuid>,
    Json(mut request): Json<NewMenuItem>,
) -> ApiResult<MenuItem> {
    let tenant = managed_tenant(&state, &admin, id).await?;
    request.name = request.name.trim().to_string();
    if request.name.is_empty() {
        return Err(ApiError::field_error("name", "is required"));
    }
    if request.price < Decimal::ZERO {
        return Err(ApiError::field_error("price", "must not be negative"));
    }
    let item = state.store.create_menu_item(tenant.id, request).await?;
    Ok(ApiResponse::created(item))
}
