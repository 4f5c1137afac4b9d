use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use rust_decimal::Decimal;
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::database::models::{
    Branch, Category, Customer, MenuItem, NewBranch, NewCategory, NewMenuItem, NewOrder, NewTenant, Order, OrderLine,
    Tenant,
};
use crate::database::store::{StoreError, TenantStore};
use crate::types::{BranchId, OrderStatus, PaymentMethod, TenantId};

/// SQLSTATE `feature_not_supported`
const FEATURE_NOT_SUPPORTED: &str = "0A000";

const TENANT_COLUMNS: &str =
    "id, name, subdomain, whatsapp_number, currency, is_active, expires_at, created_at, updated_at";
const BRANCH_COLUMNS: &str =
    "id, tenant_id, name, city, areas, delivery_fee, whatsapp_number, is_active, created_at";
const MENU_ITEM_COLUMNS: &str =
    "id, tenant_id, category_id, branch_id, name, description, price, is_available, position, created_at";
const ORDER_COLUMNS: &str = "id, tenant_id, branch_id, customer_name, customer_phone, customer_address, \
     customer_area, lines, subtotal, delivery_fee, total, payment_method, status, notes, created_at, updated_at";

/// `TenantStore` over Postgres
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(FromRow)]
struct OrderRow {
    id: Uuid,
    tenant_id: TenantId,
    branch_id: Option<BranchId>,
    customer_name: String,
    customer_phone: String,
    customer_address: Option<String>,
    customer_area: Option<String>,
    lines: Json<Vec<OrderLine>>,
    subtotal: Decimal,
    delivery_fee: Decimal,
    total: Decimal,
    payment_method: String,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::parse(&row.status)
            .ok_or_else(|| StoreError::Corrupt(format!("order {} has unknown status '{}'", row.id, row.status)))?;
        let payment_method = match row.payment_method.as_str() {
            "cash_on_delivery" => PaymentMethod::CashOnDelivery,
            other => {
                return Err(StoreError::Corrupt(format!(
                    "order {} has unknown payment method '{}'",
                    row.id, other
                )))
            }
        };
        Ok(Order {
            id: row.id,
            tenant_id: row.tenant_id,
            branch_id: row.branch_id,
            customer: Customer {
                name: row.customer_name,
                phone: row.customer_phone,
                address: row.customer_address,
                area: row.customer_area,
            },
            lines: row.lines.0,
            subtotal: row.subtotal,
            delivery_fee: row.delivery_fee,
            total: row.total,
            payment_method,
            status,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Map driver errors onto store semantics
fn classify(err: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Conflict(format!("{} already exists", what));
        }
        if db.code().as_deref() == Some(FEATURE_NOT_SUPPORTED) {
            return StoreError::UnsupportedQuery(db.message().to_string());
        }
    }
    StoreError::Sqlx(err)
}

#[async_trait]
impl TenantStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_tenant_by_subdomain(&self, subdomain: &str) -> Result<Option<Tenant>, StoreError> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {} FROM tenants WHERE subdomain = $1",
            TENANT_COLUMNS
        ))
        .bind(subdomain)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tenant)
    }

    async fn get_tenant(&self, tenant: TenantId) -> Result<Option<Tenant>, StoreError> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!("SELECT {} FROM tenants WHERE id = $1", TENANT_COLUMNS))
            .bind(tenant)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tenant)
    }

    async fn list_tenants(&self) -> Result<Vec<Tenant>, StoreError> {
        let tenants = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {} FROM tenants ORDER BY created_at DESC",
            TENANT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(tenants)
    }

    async fn create_tenant(&self, tenant: NewTenant) -> Result<Tenant, StoreError> {
        sqlx::query_as::<_, Tenant>(&format!(
            "INSERT INTO tenants (id, name, subdomain, whatsapp_number, currency, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            TENANT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&tenant.name)
        .bind(&tenant.subdomain)
        .bind(&tenant.whatsapp_number)
        .bind(tenant.currency.as_deref().unwrap_or("USD"))
        .bind(tenant.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, &format!("subdomain '{}'", tenant.subdomain)))
    }

    async fn deactivate_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE tenants SET is_active = FALSE, updated_at = NOW()
             WHERE is_active AND expires_at IS NOT NULL AND expires_at <= $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn list_branches(&self, tenant: TenantId) -> Result<Vec<Branch>, StoreError> {
        let branches = sqlx::query_as::<_, Branch>(&format!(
            "SELECT {} FROM branches WHERE tenant_id = $1 ORDER BY name",
            BRANCH_COLUMNS
        ))
        .bind(tenant)
        .fetch_all(&self.pool)
        .await?;
        Ok(branches)
    }

    async fn get_branch(&self, tenant: TenantId, branch: BranchId) -> Result<Option<Branch>, StoreError> {
        let branch = sqlx::query_as::<_, Branch>(&format!(
            "SELECT {} FROM branches WHERE tenant_id = $1 AND id = $2",
            BRANCH_COLUMNS
        ))
        .bind(tenant)
        .bind(branch)
        .fetch_optional(&self.pool)
        .await?;
        Ok(branch)
    }

    async fn create_branch(&self, tenant: TenantId, branch: NewBranch) -> Result<Branch, StoreError> {
        let branch = sqlx::query_as::<_, Branch>(&format!(
            "INSERT INTO branches (id, tenant_id, name, city, areas, delivery_fee, whatsapp_number)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            BRANCH_COLUMNS
        ))
        .bind(BranchId(Uuid::new_v4()))
        .bind(tenant)
        .bind(&branch.name)
        .bind(&branch.city)
        .bind(&branch.areas)
        .bind(branch.delivery_fee)
        .bind(&branch.whatsapp_number)
        .fetch_one(&self.pool)
        .await?;
        Ok(branch)
    }

    async fn list_categories(&self, tenant: TenantId) -> Result<Vec<Category>, StoreError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, tenant_id, name, position, created_at
             FROM categories WHERE tenant_id = $1 ORDER BY position, name",
        )
        .bind(tenant)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn create_category(&self, tenant: TenantId, category: NewCategory) -> Result<Category, StoreError> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, tenant_id, name, position)
             VALUES ($1, $2, $3, $4)
             RETURNING id, tenant_id, name, position, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(tenant)
        .bind(&category.name)
        .bind(category.position)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    async fn list_menu_items(&self, tenant: TenantId, branch: Option<BranchId>) -> Result<Vec<MenuItem>, StoreError> {
        let items = sqlx::query_as::<_, MenuItem>(&format!(
            "SELECT {} FROM menu_items
             WHERE tenant_id = $1 AND (branch_id IS NULL OR branch_id = $2)
             ORDER BY position, name",
            MENU_ITEM_COLUMNS
        ))
        .bind(tenant)
        .bind(branch)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn get_menu_items(&self, tenant: TenantId, ids: &[Uuid]) -> Result<Vec<MenuItem>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let items = sqlx::query_as::<_, MenuItem>(&format!(
            "SELECT {} FROM menu_items WHERE tenant_id = $1 AND id = ANY($2)",
            MENU_ITEM_COLUMNS
        ))
        .bind(tenant)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn create_menu_item(&self, tenant: TenantId, item: NewMenuItem) -> Result<MenuItem, StoreError> {
        // Category and branch must both belong to the same tenant
        let owned: (bool, bool) = sqlx::query_as(
            "SELECT
                EXISTS (SELECT 1 FROM categories WHERE tenant_id = $1 AND id = $2),
                ($3::uuid IS NULL OR EXISTS (SELECT 1 FROM branches WHERE tenant_id = $1 AND id = $3))",
        )
        .bind(tenant)
        .bind(item.category_id)
        .bind(item.branch_id)
        .fetch_one(&self.pool)
        .await?;
        if !owned.0 {
            return Err(StoreError::NotFound(format!("category {}", item.category_id)));
        }
        if !owned.1 {
            return Err(StoreError::NotFound("branch".to_string()));
        }

        let item = sqlx::query_as::<_, MenuItem>(&format!(
            "INSERT INTO menu_items (id, tenant_id, category_id, branch_id, name, description, price, is_available, position)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {}",
            MENU_ITEM_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(tenant)
        .bind(item.category_id)
        .bind(item.branch_id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(item.is_available)
        .bind(item.position)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    async fn insert_order(&self, tenant: TenantId, order: NewOrder) -> Result<Order, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (id, tenant_id, branch_id, customer_name, customer_phone, customer_address,
                                 customer_area, lines, subtotal, delivery_fee, total, payment_method, status, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {}",
            ORDER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(tenant)
        .bind(order.branch_id)
        .bind(&order.customer.name)
        .bind(&order.customer.phone)
        .bind(&order.customer.address)
        .bind(&order.customer.area)
        .bind(Json(&order.lines))
        .bind(order.subtotal)
        .bind(order.delivery_fee)
        .bind(order.total)
        .bind(PaymentMethod::CashOnDelivery.as_str())
        .bind(OrderStatus::Pending.as_str())
        .bind(&order.notes)
        .fetch_one(&self.pool)
        .await?;
        Order::try_from(row)
    }

    async fn fetch_orders_ordered(&self, tenant: TenantId, branch: Option<BranchId>) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders
             WHERE tenant_id = $1 AND ($2::uuid IS NULL OR branch_id = $2)
             ORDER BY created_at DESC, id DESC",
            ORDER_COLUMNS
        ))
        .bind(tenant)
        .bind(branch)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| classify(e, "order"))?;
        rows.into_iter().map(Order::try_from).collect()
    }

    async fn fetch_orders_unordered(&self, tenant: TenantId, branch: Option<BranchId>) -> Result<Vec<Order>, StoreError> {
        let query = format!(
            "SELECT {} FROM orders WHERE tenant_id = $1 AND ($2::uuid IS NULL OR branch_id = $2)",
            ORDER_COLUMNS
        );
        sqlx::query_as::<_, OrderRow>(&query)
            .bind(tenant)
            .bind(branch)
            .fetch(&self.pool)
            .map_err(StoreError::from)
            .and_then(|row| futures::future::ready(Order::try_from(row)))
            .try_collect()
            .await
    }

    async fn get_order(&self, tenant: TenantId, order: Uuid) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE tenant_id = $1 AND id = $2",
            ORDER_COLUMNS
        ))
        .bind(tenant)
        .bind(order)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Order::try_from).transpose()
    }

    async fn update_order_status(&self, tenant: TenantId, order: Uuid, status: OrderStatus) -> Result<Order, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $3, updated_at = NOW()
             WHERE tenant_id = $1 AND id = $2
             RETURNING {}",
            ORDER_COLUMNS
        ))
        .bind(tenant)
        .bind(order)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("order {}", order)))?;
        Order::try_from(row)
    }
}
