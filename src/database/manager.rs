use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::store::StoreError;

/// Builds the shared Postgres pool
pub struct DatabaseManager;

impl DatabaseManager {
    /// Create the pool lazily so the server can boot (and report a degraded
    /// `/health`) while the database is still unreachable.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
        Self::validate_url(&config.url)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy(&config.url)?;
        info!("Configured database pool for {}", Self::redacted_url(&config.url));
        Ok(pool)
    }

    /// Create the pool and wait for a first connection
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
        Self::validate_url(&config.url)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await?;
        info!("Connected to database {}", Self::redacted_url(&config.url));
        Ok(pool)
    }

    pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    fn validate_url(raw: &str) -> Result<(), StoreError> {
        if raw.trim().is_empty() {
            return Err(StoreError::Sqlx(sqlx::Error::Configuration("DATABASE_URL is not set".into())));
        }
        let url = url::Url::parse(raw)
            .map_err(|e| StoreError::Sqlx(sqlx::Error::Configuration(format!("invalid DATABASE_URL: {}", e).into())))?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(()),
            other => Err(StoreError::Sqlx(sqlx::Error::Configuration(
                format!("unsupported database scheme '{}'", other).into(),
            ))),
        }
    }

    /// Connection string safe for logs (password masked)
    pub fn redacted_url(raw: &str) -> String {
        match url::Url::parse(raw) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("***"));
                }
                url.into()
            }
            Err(_) => "<invalid url>".to_string(),
        }
    }
}
