use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use menuhost_api::app::{self, AppState};
use menuhost_api::database::{DatabaseManager, PgStore, TenantStore};
use menuhost_api::{is_development, services};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, TENANT_ROOT_DOMAIN, etc.
    let _ = dotenvy::dotenv();

    let default_filter = if is_development!() {
        "menuhost_api=debug,tower_http=debug,info"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = menuhost_api::config::config();
    tracing::info!(
        "Starting Menuhost API in {:?} mode, root domain {}",
        config.environment,
        config.tenant.root_domain
    );

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }

    // Lazy pool: the server comes up (and /health reports degraded) without a database
    let pool = DatabaseManager::connect_lazy(&config.database)?;

    if config.database.run_migrations {
        if let Err(e) = DatabaseManager::migrate(&pool).await {
            tracing::warn!("migrations not applied: {}", e);
        }
    }

    let store: Arc<dyn TenantStore> = Arc::new(PgStore::new(pool));

    if config.sweep.enabled {
        services::spawn_expiry_sweep(store.clone(), Duration::from_secs(config.sweep.interval_secs.max(1)));
    }

    let state = AppState::new(store, &config.tenant, &config.security.jwt_secret);
    let app = app::build(state, config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Menuhost API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
