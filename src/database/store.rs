use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{
    Branch, Category, MenuItem, NewBranch, NewCategory, NewMenuItem, NewOrder, NewTenant, Order, Tenant,
};
use crate::types::{BranchId, OrderStatus, TenantId};

/// Errors from a `TenantStore`
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backend cannot serve a composite filter + ordering query
    #[error("Unsupported query: {0}")]
    UnsupportedQuery(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Tenant-scoped persistence.
///
/// Every method touching tenant-owned data takes the `TenantId` first and
/// filters on it; implementations must never return or modify a record
/// whose `tenant_id` differs. Branch narrowing is an extra filter, never a
/// replacement for the tenant filter.
#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    // Tenants (resolution reads; administration writes)

    /// Exact match on the stored lower-case subdomain. Callers normalize.
    async fn find_tenant_by_subdomain(&self, subdomain: &str) -> Result<Option<Tenant>, StoreError>;
    async fn get_tenant(&self, tenant: TenantId) -> Result<Option<Tenant>, StoreError>;
    async fn list_tenants(&self) -> Result<Vec<Tenant>, StoreError>;
    async fn create_tenant(&self, tenant: NewTenant) -> Result<Tenant, StoreError>;
    /// Flip `is_active` off for every active tenant with `expires_at <= now`
    async fn deactivate_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;

    // Branches

    async fn list_branches(&self, tenant: TenantId) -> Result<Vec<Branch>, StoreError>;
    async fn get_branch(&self, tenant: TenantId, branch: BranchId) -> Result<Option<Branch>, StoreError>;
    async fn create_branch(&self, tenant: TenantId, branch: NewBranch) -> Result<Branch, StoreError>;

    // Menu

    async fn list_categories(&self, tenant: TenantId) -> Result<Vec<Category>, StoreError>;
    async fn create_category(&self, tenant: TenantId, category: NewCategory) -> Result<Category, StoreError>;
    /// Items for the tenant; with a branch, only items that branch offers
    async fn list_menu_items(&self, tenant: TenantId, branch: Option<BranchId>) -> Result<Vec<MenuItem>, StoreError>;
    async fn get_menu_items(&self, tenant: TenantId, ids: &[Uuid]) -> Result<Vec<MenuItem>, StoreError>;
    async fn create_menu_item(&self, tenant: TenantId, item: NewMenuItem) -> Result<MenuItem, StoreError>;

    // Orders

    async fn insert_order(&self, tenant: TenantId, order: NewOrder) -> Result<Order, StoreError>;
    /// Newest first. May fail with `UnsupportedQuery`; see `scoped::list_orders`.
    async fn fetch_orders_ordered(&self, tenant: TenantId, branch: Option<BranchId>) -> Result<Vec<Order>, StoreError>;
    /// Same scoped set, no ordering guarantee
    async fn fetch_orders_unordered(&self, tenant: TenantId, branch: Option<BranchId>) -> Result<Vec<Order>, StoreError>;
    async fn get_order(&self, tenant: TenantId, order: Uuid) -> Result<Option<Order>, StoreError>;
    async fn update_order_status(&self, tenant: TenantId, order: Uuid, status: OrderStatus) -> Result<Order, StoreError>;
}
