use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tower::Layer;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, Environment, TenantConfig};
use crate::database::TenantStore;
use crate::handlers::{admin, public, service};
use crate::middleware::{admin_auth_middleware, resolve_tenant_middleware};
use crate::tenancy::TenantResolver;

/// Shared per-process state handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TenantStore>,
    pub resolver: Arc<TenantResolver>,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<dyn TenantStore>, tenant: &TenantConfig, jwt_secret: &str) -> Self {
        Self {
            store,
            resolver: Arc::new(TenantResolver::new(tenant)),
            jwt_secret: Arc::from(jwt_secret),
        }
    }
}

/// Full application: tenant resolution wrapped around the route table.
///
/// The resolver has to see the request before the router matches it, so the
/// route table is mounted as a service behind the middleware instead of
/// taking the middleware as a layer.
pub fn build(state: AppState, config: &AppConfig) -> Router {
    let resolved = from_fn_with_state(state.clone(), resolve_tenant_middleware).layer(routes(state));

    let app = Router::new().fallback_service(resolved).layer(cors_layer(config));

    if config.api.enable_request_logging {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    }
}

/// Route table as seen after resolution
pub fn routes(state: AppState) -> Router {
    Router::new()
        // Service
        .route("/", get(service::root))
        .route("/health", get(service::health))
        // Administration (JWT)
        .nest("/api/admin", admin_routes(state.clone()))
        // Storefront, tenant-positional
        .route("/:subdomain", get(public::storefront))
        .route("/:subdomain/", get(public::storefront))
        .route("/:subdomain/branches", get(public::branches))
        .route("/:subdomain/menu", get(public::menu))
        .route("/:subdomain/orders", post(public::place_order))
        .fallback(service::not_found)
        .with_state(state)
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/tenants", get(admin::tenants::list).post(admin::tenants::create))
        .route(
            "/tenants/:id/branches",
            get(admin::branches::list).post(admin::branches::create),
        )
        .route(
            "/tenants/:id/categories",
            get(admin::menu::list_categories).post(admin::menu::create_category),
        )
        .route(
            "/tenants/:id/items",
            get(admin::menu::list_items).post(admin::menu::create_item),
        )
        .route("/tenants/:id/orders", get(admin::orders::list))
        .route("/tenants/:id/orders/:order_id", patch(admin::orders::update_status))
        .route_layer(from_fn_with_state(state, admin_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if matches!(config.environment, Environment::Development) {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
