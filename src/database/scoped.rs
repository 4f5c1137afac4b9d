use std::cmp::Ordering;

use crate::database::models::Order;
use crate::database::store::{StoreError, TenantStore};
use crate::types::{BranchId, TenantId};

/// Tenant (and optionally branch) scoped order listing, newest first.
///
/// Tries the store's ordered query. If the backend cannot serve the
/// composite tenant + branch + time ordering, falls back to the unordered
/// scoped fetch and sorts here, so callers see the same order either way.
pub async fn list_orders(
    store: &dyn TenantStore,
    tenant: TenantId,
    branch: Option<BranchId>,
) -> Result<Vec<Order>, StoreError> {
    match store.fetch_orders_ordered(tenant, branch).await {
        Ok(orders) => Ok(orders),
        Err(StoreError::UnsupportedQuery(reason)) => {
            tracing::warn!(
                tenant = %tenant,
                branch = ?branch,
                "ordered order query unsupported ({}), sorting client-side",
                reason
            );
            let mut orders = store.fetch_orders_unordered(tenant, branch).await?;
            sort_newest_first(&mut orders);
            Ok(orders)
        }
        Err(other) => Err(other),
    }
}

/// Descending `created_at`, ties broken by descending id. Matches the SQL
/// `ORDER BY created_at DESC, id DESC`.
pub fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| match b.created_at.cmp(&a.created_at) {
        Ordering::Equal => b.id.cmp(&a.id),
        other => other,
    });
}
