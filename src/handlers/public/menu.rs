use axum::extract::{Query, State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Category, MenuItem};
use crate::error::ApiError;
use crate::middleware::{ActiveTenant, ApiResponse, ApiResult};
use crate::types::BranchId;

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    /// Show the menu as served by this branch
    pub branch: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct Menu {
    pub currency: String,
    pub branch_id: Option<BranchId>,
    pub sections: Vec<MenuSection>,
}

#[derive(Debug, Serialize)]
pub struct MenuSection {
    pub category_id: Uuid,
    pub name: String,
    pub items: Vec<MenuEntry>,
}

#[derive(Debug, Serialize)]
pub struct MenuEntry {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
}

/// GET /:subdomain/menu[?branch=<id>]
pub async fn menu(
    State(state): State<AppState>,
    ActiveTenant(tenant): ActiveTenant,
    Query(query): Query<MenuQuery>,
) -> ApiResult<Menu> {
    let branch = match query.branch.map(BranchId) {
        Some(id) => match state.store.get_branch(tenant.id, id).await? {
            Some(branch) if branch.is_active => Some(branch.id),
            _ => return Err(ApiError::not_found("Branch not found")),
        },
        None => None,
    };

    let categories = state.store.list_categories(tenant.id).await?;
    let items = state.store.list_menu_items(tenant.id, branch).await?;

    Ok(ApiResponse::success(Menu {
        currency: tenant.currency,
        branch_id: branch,
        sections: build_sections(categories, items, branch),
    }))
}

/// Group available items under their categories, categories by position.
/// Empty categories are left out.
pub fn build_sections(mut categories: Vec<Category>, items: Vec<MenuItem>, branch: Option<BranchId>) -> Vec<MenuSection> {
    categories.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.name.cmp(&b.name)));

    let mut items: Vec<MenuItem> = items
        .into_iter()
        .filter(|item| item.is_available && item.offered_at(branch))
        .collect();
    items.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.name.cmp(&b.name)));

    categories
        .into_iter()
        .filter_map(|category| {
            let entries: Vec<MenuEntry> = items
                .iter()
                .filter(|item| item.category_id == category.id)
                .map(|item| MenuEntry {
                    id: item.id,
                    name: item.name.clone(),
                    description: item.description.clone(),
                    price: item.price,
                })
                .collect();
            (!entries.is_empty()).then(|| MenuSection {
                category_id: category.id,
                name: category.name,
                items: entries,
            })
        })
        .collect()
}
