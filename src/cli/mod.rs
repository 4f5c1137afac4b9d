pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "menuhost")]
#[command(about = "Menuhost CLI - operator tools for the multi-tenant menu API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Show how a host and path would be resolved to a tenant")]
    Resolve(commands::resolve::ResolveArgs),

    #[command(about = "Deactivate tenants whose subscription has expired")]
    Sweep(commands::sweep::SweepArgs),

    #[command(about = "Mint an admin JWT signed with the configured secret")]
    Token(commands::token::TokenArgs),

    #[command(about = "Check server health via the /health endpoint")]
    Health(commands::health::HealthArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Resolve(args) => commands::resolve::handle(args, output_format),
        Commands::Sweep(args) => commands::sweep::handle(args, output_format).await,
        Commands::Token(args) => commands::token::handle(args, output_format),
        Commands::Health(args) => commands::health::handle(args, output_format).await,
    }
}
