use chrono::Utc;
use clap::Args;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::{DatabaseManager, PgStore};
use crate::services::sweep_once;

#[derive(Args)]
pub struct SweepArgs {
    #[arg(long, help = "Apply pending migrations before sweeping")]
    pub migrate: bool,
}

pub async fn handle(args: SweepArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config().database).await?;
    if args.migrate {
        DatabaseManager::migrate(&pool).await?;
    }

    let store = PgStore::new(pool);
    let deactivated = sweep_once(&store, Utc::now()).await?;

    output_success(
        output_format,
        &format!("Deactivated {} expired tenant(s)", deactivated),
        Some(json!({ "deactivated": deactivated })),
    )
}
