pub mod branches;
pub mod menu;
pub mod orders;
pub mod tenants;

use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::Tenant;
use crate::error::ApiError;
use crate::middleware::AdminUser;
use crate::types::TenantId;

/// Load a restaurant the caller is allowed to manage. Permission is checked
/// before the lookup so owners cannot probe for other tenants' ids.
pub(crate) async fn managed_tenant(state: &AppState, admin: &AdminUser, id: Uuid) -> Result<Tenant, ApiError> {
    let tenant_id = TenantId(id);
    admin.ensure_can_manage(tenant_id)?;
    state
        .store
        .get_tenant(tenant_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Restaurant not found"))
}
