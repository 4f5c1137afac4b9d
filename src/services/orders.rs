use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{Branch, Customer, NewOrder, Order, OrderLine, Tenant};
use crate::database::{StoreError, TenantStore};
use crate::error::ApiError;
use crate::types::{BranchId, OrderStatus, TenantId};

pub const MAX_LINES: usize = 50;
pub const MAX_QUANTITY: u32 = 99;

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    pub branch_id: Option<BranchId>,
    pub customer: Customer,
    pub lines: Vec<LineRequest>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineRequest {
    pub menu_item_id: Uuid,
    pub quantity: u32,
    pub notes: Option<String>,
}

/// Stored order plus the WhatsApp hand-off link, when a number is configured
#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    pub order: Order,
    pub whatsapp_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("{field}: {problem}")]
    Invalid { field: String, problem: String },

    #[error("order {0} not found")]
    NotFound(Uuid),

    #[error("cannot move order from {from} to {to}")]
    IllegalTransition { from: &'static str, to: &'static str },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OrderError {
    fn invalid(field: impl Into<String>, problem: impl Into<String>) -> Self {
        OrderError::Invalid {
            field: field.into(),
            problem: problem.into(),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Invalid { field, problem } => ApiError::field_error(field, problem),
            OrderError::NotFound(id) => ApiError::not_found(format!("Order {} not found", id)),
            e @ OrderError::IllegalTransition { .. } => ApiError::conflict(e.to_string()),
            OrderError::Store(e) => e.into(),
        }
    }
}

/// Validate, route, price and persist a cash-on-delivery order.
pub async fn place_order(
    store: &dyn TenantStore,
    tenant: &Tenant,
    request: PlaceOrderRequest,
) -> Result<PlacedOrder, OrderError> {
    validate_request(&request)?;

    let branch = route_to_branch(store, tenant.id, request.branch_id, request.customer.area.as_deref()).await?;
    let branch_id = branch.as_ref().map(|b| b.id);

    let ids: Vec<Uuid> = request.lines.iter().map(|l| l.menu_item_id).collect();
    let items: HashMap<Uuid, _> = store
        .get_menu_items(tenant.id, &ids)
        .await?
        .into_iter()
        .map(|item| (item.id, item))
        .collect();

    let mut lines = Vec::with_capacity(request.lines.len());
    for (index, line) in request.lines.iter().enumerate() {
        let field = format!("lines[{}].menu_item_id", index);
        let item = items
            .get(&line.menu_item_id)
            .ok_or_else(|| OrderError::invalid(&field, "unknown menu item"))?;
        if !item.is_available {
            return Err(OrderError::invalid(&field, format!("'{}' is not available", item.name)));
        }
        if !item.offered_at(branch_id) {
            return Err(OrderError::invalid(&field, format!("'{}' is not offered at this branch", item.name)));
        }
        lines.push(OrderLine {
            menu_item_id: item.id,
            name: item.name.clone(),
            unit_price: item.price,
            quantity: line.quantity,
            line_total: Decimal::ZERO,
            notes: line.notes.clone(),
        });
    }

    let fee = branch.as_ref().map(|b| b.delivery_fee).unwrap_or(Decimal::ZERO);
    let totals = recompute_totals(&mut lines, fee);

    let order = store
        .insert_order(
            tenant.id,
            NewOrder {
                branch_id,
                customer: request.customer,
                lines,
                subtotal: totals.subtotal,
                delivery_fee: totals.delivery_fee,
                total: totals.total,
                notes: request.notes,
            },
        )
        .await?;

    tracing::info!(
        tenant = %tenant.subdomain,
        order = %order.id,
        branch = ?branch_id,
        total = %order.total,
        "order placed"
    );

    let whatsapp_url = branch
        .as_ref()
        .and_then(|b| b.whatsapp_number.as_deref())
        .or(tenant.whatsapp_number.as_deref())
        .and_then(|number| whatsapp_link(number, &order_message(tenant, branch.as_ref(), &order)));

    Ok(PlacedOrder { order, whatsapp_url })
}

fn validate_request(request: &PlaceOrderRequest) -> Result<(), OrderError> {
    if request.customer.name.trim().is_empty() {
        return Err(OrderError::invalid("customer.name", "required"));
    }
    let phone_digits = request.customer.phone.chars().filter(|c| c.is_ascii_digit()).count();
    if phone_digits < 6 {
        return Err(OrderError::invalid("customer.phone", "must contain at least 6 digits"));
    }
    if request.lines.is_empty() {
        return Err(OrderError::invalid("lines", "order has no items"));
    }
    if request.lines.len() > MAX_LINES {
        return Err(OrderError::invalid("lines", format!("at most {} lines per order", MAX_LINES)));
    }
    for (index, line) in request.lines.iter().enumerate() {
        if line.quantity == 0 || line.quantity > MAX_QUANTITY {
            return Err(OrderError::invalid(
                format!("lines[{}].quantity", index),
                format!("must be between 1 and {}", MAX_QUANTITY),
            ));
        }
    }
    Ok(())
}

/// Pick the branch that receives the order.
///
/// Explicit branch > branch serving the delivery area > the only branch.
/// A tenant without branches takes tenant-scoped orders.
pub async fn route_to_branch(
    store: &dyn TenantStore,
    tenant: TenantId,
    requested: Option<BranchId>,
    area: Option<&str>,
) -> Result<Option<Branch>, OrderError> {
    let branches: Vec<Branch> = store
        .list_branches(tenant)
        .await?
        .into_iter()
        .filter(|b| b.is_active)
        .collect();
    let area = area.map(str::trim).filter(|a| !a.is_empty());

    if let Some(requested) = requested {
        let branch = branches
            .into_iter()
            .find(|b| b.id == requested)
            .ok_or_else(|| OrderError::invalid("branch_id", "unknown branch"))?;
        if let Some(area) = area {
            if !branch.areas.is_empty() && !branch.serves_area(area) {
                return Err(OrderError::invalid("customer.area", "this branch does not deliver to the area"));
            }
        }
        return Ok(Some(branch));
    }

    if branches.is_empty() {
        return Ok(None);
    }

    if let Some(area) = area {
        return branches
            .into_iter()
            .find(|b| b.serves_area(area))
            .map(Some)
            .ok_or_else(|| OrderError::invalid("customer.area", "no branch delivers to this area"));
    }

    if branches.len() == 1 {
        return Ok(branches.into_iter().next());
    }

    Err(OrderError::invalid("customer.area", "choose a branch or a delivery area"))
}

/// Fill in line totals and return order totals. The only place order
/// amounts are computed.
pub fn recompute_totals(lines: &mut [OrderLine], delivery_fee: Decimal) -> Totals {
    let mut subtotal = Decimal::ZERO;
    for line in lines.iter_mut() {
        line.line_total = line.unit_price * Decimal::from(line.quantity);
        subtotal += line.line_total;
    }
    Totals {
        subtotal,
        delivery_fee,
        total: subtotal + delivery_fee,
    }
}

/// Move an order along its lifecycle
pub async fn advance_status(
    store: &dyn TenantStore,
    tenant: TenantId,
    order_id: Uuid,
    next: OrderStatus,
) -> Result<Order, OrderError> {
    let order = store
        .get_order(tenant, order_id)
        .await?
        .ok_or(OrderError::NotFound(order_id))?;

    if !order.status.can_transition_to(next) {
        return Err(OrderError::IllegalTransition {
            from: order.status.as_str(),
            to: next.as_str(),
        });
    }

    let updated = store.update_order_status(tenant, order_id, next).await?;
    tracing::info!(%tenant, order = %order_id, from = order.status.as_str(), to = next.as_str(), "order status changed");
    Ok(updated)
}

/// `https://wa.me/<digits>?text=<message>`; `None` when the number has too
/// few digits to be dialable.
pub fn whatsapp_link(number: &str, message: &str) -> Option<String> {
    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 6 {
        return None;
    }
    let mut url = url::Url::parse("https://wa.me/").ok()?;
    url.set_path(&digits);
    url.query_pairs_mut().append_pair("text", message);
    Some(url.into())
}

fn order_message(tenant: &Tenant, branch: Option<&Branch>, order: &Order) -> String {
    let reference = order.id.simple().to_string();
    let mut message = match branch {
        Some(branch) => format!("New order #{} for {} ({})\n", &reference[..8], tenant.name, branch.name),
        None => format!("New order #{} for {}\n", &reference[..8], tenant.name),
    };
    for line in &order.lines {
        message.push_str(&format!("{} x {} = {}\n", line.quantity, line.name, line.line_total));
    }
    message.push_str(&format!("Subtotal: {} {}\n", order.subtotal, tenant.currency));
    message.push_str(&format!("Delivery: {} {}\n", order.delivery_fee, tenant.currency));
    message.push_str(&format!("Total: {} {}\n", order.total, tenant.currency));
    message.push_str("Payment: cash on delivery\n");
    message.push_str(&format!("Name: {}\nPhone: {}", order.customer.name, order.customer.phone));
    if let Some(address) = &order.customer.address {
        message.push_str(&format!("\nAddress: {}", address));
    }
    if let Some(notes) = &order.notes {
        message.push_str(&format!("\nNotes: {}", notes));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MemoryStore};
    use std::str::FromStr;

    fn customer(area: Option<&str>) -> Customer {
        Customer {
            name: "Dana".to_string(),
            phone: "+1 555 0100".to_string(),
            address: Some("12 Elm St".to_string()),
            area: area.map(str::to_string),
        }
    }

    fn line(item: Uuid, quantity: u32) -> LineRequest {
        LineRequest {
            menu_item_id: item,
            quantity,
            notes: None,
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn totals_include_delivery_fee() {
        let mut lines = vec![
            OrderLine {
                menu_item_id: Uuid::new_v4(),
                name: "Burger".to_string(),
                unit_price: dec("8.50"),
                quantity: 2,
                line_total: Decimal::ZERO,
                notes: None,
            },
            OrderLine {
                menu_item_id: Uuid::new_v4(),
                name: "Fries".to_string(),
                unit_price: dec("3.25"),
                quantity: 1,
                line_total: Decimal::ZERO,
                notes: None,
            },
        ];
        let totals = recompute_totals(&mut lines, dec("2.50"));
        assert_eq!(lines[0].line_total, dec("17.00"));
        assert_eq!(totals.subtotal, dec("20.25"));
        assert_eq!(totals.total, dec("22.75"));
    }

    #[tokio::test]
    async fn places_order_routed_by_area() {
        let store = MemoryStore::new();
        let tenant = fixtures::tenant(&store, "thecircle").await;
        let _north = fixtures::branch(&store, tenant.id, "North", &["Hillside"]).await;
        let south = fixtures::branch(&store, tenant.id, "South", &["Harbor", "Old Town"]).await;
        let mains = fixtures::category(&store, tenant.id, "Mains", 1).await;
        let burger = fixtures::item(&store, tenant.id, mains.id, "Burger", "8.50", None).await;

        let placed = place_order(
            &store,
            &tenant,
            PlaceOrderRequest {
                branch_id: None,
                customer: customer(Some("old town")),
                lines: vec![line(burger.id, 2)],
                notes: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(placed.order.branch_id, Some(south.id));
        assert_eq!(placed.order.total, dec("19.50"));
        assert_eq!(placed.order.status, OrderStatus::Pending);
        let link = placed.whatsapp_url.unwrap();
        assert!(link.starts_with("https://wa.me/15550100200?text="));
    }

    #[tokio::test]
    async fn rejects_items_from_another_tenant() {
        let store = MemoryStore::new();
        let tenant = fixtures::tenant(&store, "thecircle").await;
        let other = fixtures::tenant(&store, "rival").await;
        let cat = fixtures::category(&store, other.id, "Mains", 1).await;
        let foreign = fixtures::item(&store, other.id, cat.id, "Steak", "30.00", None).await;

        let err = place_order(
            &store,
            &tenant,
            PlaceOrderRequest {
                branch_id: None,
                customer: customer(None),
                lines: vec![line(foreign.id, 1)],
                notes: None,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, OrderError::Invalid { ref field, .. } if field == "lines[0].menu_item_id"));
    }

    #[tokio::test]
    async fn requires_area_when_several_branches() {
        let store = MemoryStore::new();
        let tenant = fixtures::tenant(&store, "thecircle").await;
        fixtures::branch(&store, tenant.id, "North", &["Hillside"]).await;
        fixtures::branch(&store, tenant.id, "South", &["Harbor"]).await;

        let routed = route_to_branch(&store, tenant.id, None, None).await;
        assert!(matches!(routed, Err(OrderError::Invalid { .. })));

        let routed = route_to_branch(&store, tenant.id, None, Some("Nowhere")).await;
        assert!(matches!(routed, Err(OrderError::Invalid { .. })));
    }

    #[tokio::test]
    async fn branch_from_other_tenant_is_unknown() {
        let store = MemoryStore::new();
        let tenant = fixtures::tenant(&store, "thecircle").await;
        let other = fixtures::tenant(&store, "rival").await;
        let foreign = fixtures::branch(&store, other.id, "Rival HQ", &[]).await;

        let routed = route_to_branch(&store, tenant.id, Some(foreign.id), None).await;
        assert!(matches!(routed, Err(OrderError::Invalid { ref field, .. }) if field == "branch_id"));
    }

    #[tokio::test]
    async fn validates_quantities_and_customer() {
        let store = MemoryStore::new();
        let tenant = fixtures::tenant(&store, "thecircle").await;
        let request = |quantity, phone: &str| PlaceOrderRequest {
            branch_id: None,
            customer: Customer {
                phone: phone.to_string(),
                ..customer(None)
            },
            lines: vec![line(Uuid::new_v4(), quantity)],
            notes: None,
        };

        let err = place_order(&store, &tenant, request(0, "5550100")).await.unwrap_err();
        assert!(matches!(err, OrderError::Invalid { ref field, .. } if field == "lines[0].quantity"));

        let err = place_order(&store, &tenant, request(1, "12")).await.unwrap_err();
        assert!(matches!(err, OrderError::Invalid { ref field, .. } if field == "customer.phone"));
    }

    #[tokio::test]
    async fn status_changes_follow_lifecycle() {
        let store = MemoryStore::new();
        let tenant = fixtures::tenant(&store, "thecircle").await;
        let order = store.insert_order_at(tenant.id, None, chrono::Utc::now()).await;

        let err = advance_status(&store, tenant.id, order.id, OrderStatus::Delivered).await.unwrap_err();
        assert!(matches!(err, OrderError::IllegalTransition { .. }));

        let confirmed = advance_status(&store, tenant.id, order.id, OrderStatus::Confirmed).await.unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);

        let other = fixtures::tenant(&store, "rival").await;
        let err = advance_status(&store, other.id, order.id, OrderStatus::Preparing).await.unwrap_err();
        assert!(matches!(err, OrderError::NotFound(_)));
    }

    #[test]
    fn whatsapp_link_requires_digits() {
        assert_eq!(whatsapp_link("n/a", "hi"), None);
        assert_eq!(
            whatsapp_link("+44 20 7946 0000", "2 x Tea").as_deref(),
            Some("https://wa.me/442079460000?text=2+x+Tea")
        );
    }
}
