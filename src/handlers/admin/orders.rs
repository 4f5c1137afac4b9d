use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::{models::Order, scoped};
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::services;
use crate::types::{BranchId, OrderStatus};

use super::managed_tenant;

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub branch: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// GET /api/admin/tenants/:id/orders[?branch=<id>] - newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<Uuid>,
    Query(query): Query<OrdersQuery>,
) -> ApiResult<Vec<Order>> {
    let tenant = managed_tenant(&state, &admin, id).await?;
    let orders = scoped::list_orders(state.store.as_ref(), tenant.id, query.branch.map(BranchId)).await?;
    Ok(ApiResponse::list(orders))
}

/// PATCH /api/admin/tenants/:id/orders/:order_id
pub async fn update_status(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path((id, order_id)): Path<(Uuid, Uuid)>,
    Json(update): Json<StatusUpdate>,
) -> ApiResult<Order> {
    let tenant = managed_tenant(&state, &admin, id).await?;
    let order = services::advance_status(state.store.as_ref(), tenant.id, order_id, update.status).await?;
    Ok(ApiResponse::success(order))
}
