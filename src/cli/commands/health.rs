use std::time::Duration;

use clap::Args;
use serde_json::{json, Value};

use crate::cli::utils::{output_error, output_fields, output_success};
use crate::cli::OutputFormat;

#[derive(Args)]
pub struct HealthArgs {
    #[arg(long, default_value = "http://localhost:3000", help = "Server base URL")]
    pub url: String,

    #[arg(long, default_value_t = 5, help = "Request timeout in seconds")]
    pub timeout: u64,
}

pub async fn handle(args: HealthArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let url = format!("{}/health", args.url.trim_end_matches('/'));
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()?;

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(e) => {
            output_error(output_format, &format!("{} unreachable: {}", url, e), Some("UNREACHABLE"))?;
            anyhow::bail!("health check failed");
        }
    };

    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    let server_status = body["data"]["status"].as_str().unwrap_or("unknown").to_string();

    if !status.is_success() {
        output_error(
            output_format,
            &format!("{} reported {} ({})", url, server_status, status),
            Some("DEGRADED"),
        )?;
        anyhow::bail!("health check failed");
    }

    match output_format {
        OutputFormat::Json => output_success(
            output_format,
            "healthy",
            Some(json!({ "url": url, "http_status": status.as_u16(), "health": body["data"] })),
        ),
        OutputFormat::Text => {
            println!("✓ {} is healthy", args.url);
            output_fields(&[
                ("status", server_status),
                ("database", body["data"]["database"].as_str().unwrap_or("unknown").to_string()),
            ]);
            Ok(())
        }
    }
}
