use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use crate::database::{StoreError, TenantStore};

/// Deactivate every tenant whose subscription expired at or before `now`
pub async fn sweep_once(store: &dyn TenantStore, now: DateTime<Utc>) -> Result<u64, StoreError> {
    let deactivated = store.deactivate_expired(now).await?;
    if deactivated > 0 {
        tracing::info!(deactivated, "expired tenants deactivated");
    } else {
        tracing::debug!("expiry sweep found nothing to deactivate");
    }
    Ok(deactivated)
}

/// Run `sweep_once` on a fixed interval until the runtime shuts down.
/// Failures are logged and retried on the next tick.
pub fn spawn_expiry_sweep(store: Arc<dyn TenantStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = sweep_once(store.as_ref(), Utc::now()).await {
                tracing::warn!("expiry sweep failed: {}", e);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MemoryStore};
    use chrono::Duration as ChronoDuration;

    #[tokio::test]
    async fn deactivates_only_expired_tenants() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let expired = fixtures::tenant(&store, "expired").await;
        let current = fixtures::tenant(&store, "current").await;
        let forever = fixtures::tenant(&store, "forever").await;
        store.set_tenant_state(expired.id, true, Some(now - ChronoDuration::hours(1))).await;
        store.set_tenant_state(current.id, true, Some(now + ChronoDuration::days(3))).await;

        assert_eq!(sweep_once(&store, now).await.unwrap(), 1);
        assert!(!store.get_tenant(expired.id).await.unwrap().unwrap().is_active);
        assert!(store.get_tenant(current.id).await.unwrap().unwrap().is_active);
        assert!(store.get_tenant(forever.id).await.unwrap().unwrap().is_active);

        // already inactive: nothing left to do
        assert_eq!(sweep_once(&store, now).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn background_task_runs_first_tick_immediately() {
        let store = Arc::new(MemoryStore::new());
        let tenant = fixtures::tenant(&store, "expired").await;
        store.set_tenant_state(tenant.id, true, Some(Utc::now() - ChronoDuration::minutes(1))).await;

        let handle = spawn_expiry_sweep(store.clone(), Duration::from_secs(3600));
        for _ in 0..50 {
            if !store.get_tenant(tenant.id).await.unwrap().unwrap().is_active {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert!(!store.get_tenant(tenant.id).await.unwrap().unwrap().is_active);
    }
}
