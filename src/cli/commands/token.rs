use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, AdminRole, Claims};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::types::TenantId;

#[derive(Args)]
pub struct TokenArgs {
    #[arg(long, value_enum, default_value_t = AdminRole::Owner)]
    pub role: AdminRole,

    #[arg(long, help = "Restaurant id (required for owners)")]
    pub tenant: Option<Uuid>,

    #[arg(long, default_value = "operator", help = "Token subject")]
    pub subject: String,

    #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config().security;
    let hours = args.hours.unwrap_or(security.jwt_expiry_hours);
    let claims = Claims::new(args.subject, args.role, args.tenant.map(TenantId), hours);
    let token = generate_jwt(&claims, &security.jwt_secret)?;

    match output_format {
        // bare token so the output can be captured with $(menuhost token ...)
        OutputFormat::Text => println!("{}", token),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "success": true,
                "token": token,
                "expires_at": claims.exp,
            }))?
        ),
    }
    Ok(())
}
