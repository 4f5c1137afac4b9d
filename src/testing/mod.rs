use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{
    Branch, Category, Customer, MenuItem, NewBranch, NewCategory, NewMenuItem, NewOrder, NewTenant, Order, Tenant,
};
use crate::database::scoped::sort_newest_first;
use crate::database::store::{StoreError, TenantStore};
use crate::types::{BranchId, OrderStatus, PaymentMethod, TenantId};

/// In-memory `TenantStore` for tests. Applies the same tenant filters as the
/// Postgres store and can be told to reject ordered order queries.
#[derive(Default)]
pub struct MemoryStore {
    tenants: RwLock<Vec<Tenant>>,
    branches: RwLock<Vec<Branch>>,
    categories: RwLock<Vec<Category>>,
    items: RwLock<Vec<MenuItem>>,
    orders: RwLock<Vec<Order>>,
    ordered_unsupported: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ordered_queries_supported(&self, supported: bool) {
        self.ordered_unsupported.store(!supported, Ordering::SeqCst);
    }

    /// Insert a minimal order with an explicit timestamp
    pub async fn insert_order_at(&self, tenant: TenantId, branch: Option<BranchId>, at: DateTime<Utc>) -> Order {
        let order = Order {
            id: Uuid::new_v4(),
            tenant_id: tenant,
            branch_id: branch,
            customer: Customer {
                name: "Test Customer".to_string(),
                phone: "+15550100".to_string(),
                address: None,
                area: None,
            },
            lines: vec![],
            subtotal: Decimal::ZERO,
            delivery_fee: Decimal::ZERO,
            total: Decimal::ZERO,
            payment_method: PaymentMethod::CashOnDelivery,
            status: OrderStatus::Pending,
            notes: None,
            created_at: at,
            updated_at: at,
        };
        self.orders.write().await.push(order.clone());
        order
    }

    /// Overwrite a tenant's activity flags
    pub async fn set_tenant_state(&self, tenant: TenantId, is_active: bool, expires_at: Option<DateTime<Utc>>) {
        let mut tenants = self.tenants.write().await;
        if let Some(t) = tenants.iter_mut().find(|t| t.id == tenant) {
            t.is_active = is_active;
            t.expires_at = expires_at;
        }
    }

    async fn scoped_orders(&self, tenant: TenantId, branch: Option<BranchId>) -> Vec<Order> {
        self.orders
            .read()
            .await
            .iter()
            .filter(|o| o.tenant_id == tenant && branch.map_or(true, |b| o.branch_id == Some(b)))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TenantStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_tenant_by_subdomain(&self, subdomain: &str) -> Result<Option<Tenant>, StoreError> {
        Ok(self.tenants.read().await.iter().find(|t| t.subdomain == subdomain).cloned())
    }

    async fn get_tenant(&self, tenant: TenantId) -> Result<Option<Tenant>, StoreError> {
        Ok(self.tenants.read().await.iter().find(|t| t.id == tenant).cloned())
    }

    async fn list_tenants(&self) -> Result<Vec<Tenant>, StoreError> {
        Ok(self.tenants.read().await.clone())
    }

    async fn create_tenant(&self, tenant: NewTenant) -> Result<Tenant, StoreError> {
        let mut tenants = self.tenants.write().await;
        if tenants.iter().any(|t| t.subdomain == tenant.subdomain) {
            return Err(StoreError::Conflict(format!("subdomain '{}' already exists", tenant.subdomain)));
        }
        let now = Utc::now();
        let created = Tenant {
            id: TenantId(Uuid::new_v4()),
            name: tenant.name,
            subdomain: tenant.subdomain,
            whatsapp_number: tenant.whatsapp_number,
            currency: tenant.currency.unwrap_or_else(|| "USD".to_string()),
            is_active: true,
            expires_at: tenant.expires_at,
            created_at: now,
            updated_at: now,
        };
        tenants.push(created.clone());
        Ok(created)
    }

    async fn deactivate_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut count = 0;
        for tenant in self.tenants.write().await.iter_mut() {
            if tenant.is_active && tenant.expires_at.map_or(false, |at| at <= now) {
                tenant.is_active = false;
                tenant.updated_at = now;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn list_branches(&self, tenant: TenantId) -> Result<Vec<Branch>, StoreError> {
        Ok(self.branches.read().await.iter().filter(|b| b.tenant_id == tenant).cloned().collect())
    }

    async fn get_branch(&self, tenant: TenantId, branch: BranchId) -> Result<Option<Branch>, StoreError> {
        Ok(self
            .branches
            .read()
            .await
            .iter()
            .find(|b| b.tenant_id == tenant && b.id == branch)
            .cloned())
    }

    async fn create_branch(&self, tenant: TenantId, branch: NewBranch) -> Result<Branch, StoreError> {
        let created = Branch {
            id: BranchId(Uuid::new_v4()),
            tenant_id: tenant,
            name: branch.name,
            city: branch.city,
            areas: branch.areas,
            delivery_fee: branch.delivery_fee,
            whatsapp_number: branch.whatsapp_number,
            is_active: true,
            created_at: Utc::now(),
        };
        self.branches.write().await.push(created.clone());
        Ok(created)
    }

    async fn list_categories(&self, tenant: TenantId) -> Result<Vec<Category>, StoreError> {
        let mut categories: Vec<Category> =
            self.categories.read().await.iter().filter(|c| c.tenant_id == tenant).cloned().collect();
        categories.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.name.cmp(&b.name)));
        Ok(categories)
    }

    async fn create_category(&self, tenant: TenantId, category: NewCategory) -> Result<Category, StoreError> {
        let created = Category {
            id: Uuid::new_v4(),
            tenant_id: tenant,
            name: category.name,
            position: category.position,
            created_at: Utc::now(),
        };
        self.categories.write().await.push(created.clone());
        Ok(created)
    }

    async fn list_menu_items(&self, tenant: TenantId, branch: Option<BranchId>) -> Result<Vec<MenuItem>, StoreError> {
        let mut items: Vec<MenuItem> = self
            .items
            .read()
            .await
            .iter()
            .filter(|i| i.tenant_id == tenant && (i.branch_id.is_none() || i.branch_id == branch))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.name.cmp(&b.name)));
        Ok(items)
    }

    async fn get_menu_items(&self, tenant: TenantId, ids: &[Uuid]) -> Result<Vec<MenuItem>, StoreError> {
        Ok(self
            .items
            .read()
            .await
            .iter()
            .filter(|i| i.tenant_id == tenant && ids.contains(&i.id))
            .cloned()
            .collect())
    }

    async fn create_menu_item(&self, tenant: TenantId, item: NewMenuItem) -> Result<MenuItem, StoreError> {
        let category_owned = self
            .categories
            .read()
            .await
            .iter()
            .any(|c| c.tenant_id == tenant && c.id == item.category_id);
        if !category_owned {
            return Err(StoreError::NotFound(format!("category {}", item.category_id)));
        }
        if let Some(branch) = item.branch_id {
            if self.get_branch(tenant, branch).await?.is_none() {
                return Err(StoreError::NotFound("branch".to_string()));
            }
        }
        let created = MenuItem {
            id: Uuid::new_v4(),
            tenant_id: tenant,
            category_id: item.category_id,
            branch_id: item.branch_id,
            name: item.name,
            description: item.description,
            price: item.price,
            is_available: item.is_available,
            position: item.position,
            created_at: Utc::now(),
        };
        self.items.write().await.push(created.clone());
        Ok(created)
    }

    async fn insert_order(&self, tenant: TenantId, order: NewOrder) -> Result<Order, StoreError> {
        let now = Utc::now();
        let created = Order {
            id: Uuid::new_v4(),
            tenant_id: tenant,
            branch_id: order.branch_id,
            customer: order.customer,
            lines: order.lines,
            subtotal: order.subtotal,
            delivery_fee: order.delivery_fee,
            total: order.total,
            payment_method: PaymentMethod::CashOnDelivery,
            status: OrderStatus::Pending,
            notes: order.notes,
            created_at: now,
            updated_at: now,
        };
        self.orders.write().await.push(created.clone());
        Ok(created)
    }

    async fn fetch_orders_ordered(&self, tenant: TenantId, branch: Option<BranchId>) -> Result<Vec<Order>, StoreError> {
        if self.ordered_unsupported.load(Ordering::SeqCst) {
            return Err(StoreError::UnsupportedQuery("composite index missing".to_string()));
        }
        let mut orders = self.scoped_orders(tenant, branch).await;
        sort_newest_first(&mut orders);
        Ok(orders)
    }

    async fn fetch_orders_unordered(&self, tenant: TenantId, branch: Option<BranchId>) -> Result<Vec<Order>, StoreError> {
        let mut orders = self.scoped_orders(tenant, branch).await;
        // insertion order would already look sorted; scramble it
        orders.reverse();
        let mid = orders.len() / 2;
        orders.rotate_left(mid);
        Ok(orders)
    }

    async fn get_order(&self, tenant: TenantId, order: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self
            .orders
            .read()
            .await
            .iter()
            .find(|o| o.tenant_id == tenant && o.id == order)
            .cloned())
    }

    async fn update_order_status(&self, tenant: TenantId, order: Uuid, status: OrderStatus) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;
        let found = orders
            .iter_mut()
            .find(|o| o.tenant_id == tenant && o.id == order)
            .ok_or_else(|| StoreError::NotFound(format!("order {}", order)))?;
        found.status = status;
        found.updated_at = Utc::now();
        Ok(found.clone())
    }
}

/// Seed helpers for tests
pub mod fixtures {
    use super::*;
    use std::str::FromStr;

    pub async fn tenant(store: &MemoryStore, subdomain: &str) -> Tenant {
        store
            .create_tenant(NewTenant {
                name: subdomain.to_string(),
                subdomain: subdomain.to_string(),
                whatsapp_number: Some("+1 (555) 010-0200".to_string()),
                currency: None,
                expires_at: None,
            })
            .await
            .expect("create tenant")
    }

    pub async fn branch(store: &MemoryStore, tenant: TenantId, name: &str, areas: &[&str]) -> Branch {
        store
            .create_branch(
                tenant,
                NewBranch {
                    name: name.to_string(),
                    city: "Springfield".to_string(),
                    areas: areas.iter().map(|a| a.to_string()).collect(),
                    delivery_fee: Decimal::from_str("2.50").unwrap(),
                    whatsapp_number: None,
                },
            )
            .await
            .expect("create branch")
    }

    pub async fn category(store: &MemoryStore, tenant: TenantId, name: &str, position: i32) -> Category {
        store
            .create_category(tenant, NewCategory { name: name.to_string(), position })
            .await
            .expect("create category")
    }

    pub async fn item(
        store: &MemoryStore,
        tenant: TenantId,
        category: Uuid,
        name: &str,
        price: &str,
        branch: Option<BranchId>,
    ) -> MenuItem {
        store
            .create_menu_item(
                tenant,
                NewMenuItem {
                    category_id: category,
                    branch_id: branch,
                    name: name.to_string(),
                    description: None,
                    price: Decimal::from_str(price).unwrap(),
                    is_available: true,
                    position: 0,
                },
            )
            .await
            .expect("create item")
    }
}
