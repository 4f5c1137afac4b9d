use clap::Args;
use serde_json::{json, Value};

use crate::cli::utils::{output_fields, output_success};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::tenancy::{Resolution, TenantResolver};

#[derive(Args)]
pub struct ResolveArgs {
    #[arg(help = "Host header value, e.g. thecircle.example.com:8080")]
    pub host: String,

    #[arg(default_value = "/", help = "Request path and query")]
    pub path: String,

    #[arg(long, help = "Root domain (defaults to TENANT_ROOT_DOMAIN / environment preset)")]
    pub root_domain: Option<String>,
}

pub fn handle(args: ResolveArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut tenant_config = config().tenant.clone();
    if let Some(root) = args.root_domain {
        tenant_config.root_domain = root;
    }
    let resolver = TenantResolver::new(&tenant_config);

    let path = if args.path.starts_with('/') {
        args.path
    } else {
        format!("/{}", args.path)
    };

    let (outcome, fields) = describe(resolver.resolve(Some(&args.host), &path, false), &path);

    match output_format {
        OutputFormat::Json => output_success(
            output_format,
            outcome,
            Some(json!({
                "host": args.host,
                "root_domain": resolver.root_domain(),
                "resolution": fields,
            })),
        ),
        OutputFormat::Text => {
            println!("{} {} -> {}", args.host, path, outcome);
            let lines = text_fields(resolver.root_domain(), &fields);
            let lines: Vec<(&str, String)> = lines.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
            output_fields(&lines);
            Ok(())
        }
    }
}

/// Outcome label plus the fields worth showing for it
fn describe(resolution: Resolution, path: &str) -> (&'static str, Value) {
    match resolution {
        Resolution::PassThrough => ("pass-through", json!({ "path": path })),
        Resolution::Redirect { location } => ("redirect", json!({ "status": 301, "location": location })),
        Resolution::Rewrite { tenant, path_and_query } => (
            "rewrite",
            json!({ "tenant": tenant.as_str(), "path": path_and_query }),
        ),
    }
}

fn text_fields(root_domain: &str, fields: &Value) -> Vec<(String, String)> {
    let mut lines = vec![("root domain".to_string(), root_domain.to_string())];
    if let Some(obj) = fields.as_object() {
        for (key, value) in obj {
            let text = match value.as_str() {
                Some(s) => s.to_string(),
                None => value.to_string(),
            };
            lines.push((key.clone(), text));
        }
    }
    lines
}
