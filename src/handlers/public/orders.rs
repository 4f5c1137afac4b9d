use axum::{extract::State, Json};

use crate::app::AppState;
use crate::middleware::{ActiveTenant, ApiResponse, ApiResult};
use crate::services::{self, PlaceOrderRequest, PlacedOrder};

/// POST /:subdomain/orders - place a cash-on-delivery order
pub async fn place_order(
    State(state): State<AppState>,
    ActiveTenant(tenant): ActiveTenant,
    Json(request): Json<PlaceOrderRequest>,
) -> ApiResult<PlacedOrder> {
    let placed = services::place_order(state.store.as_ref(), &tenant, request).await?;
    Ok(ApiResponse::created(placed))
}
