pub mod active_tenant;
pub mod auth;
pub mod resolve_tenant;
pub mod response;

pub use active_tenant::ActiveTenant;
pub use auth::{admin_auth_middleware, AdminUser};
pub use resolve_tenant::{resolve_tenant_middleware, TenantRewritten, TENANT_HEADER};
pub use response::{ApiResponse, ApiResult};
