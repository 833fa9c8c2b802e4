pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "admin-query-api")]
#[command(about = "Admin Query API - role-gated listings over site collections")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides ADMIN_API_PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Print the effective configuration with secrets masked")]
    Config,

    #[command(about = "Issue a signed session token for an admin user")]
    Token {
        #[arg(long, help = "User id placed in the token subject")]
        sub: String,
        #[arg(long, help = "Role: admin, editor, reviewer or finance")]
        role: String,
        #[arg(long, help = "Token lifetime in hours (defaults to configured expiry)")]
        hours: Option<u64>,
    },

    #[command(about = "Load documents from a JSON or YAML file of {collection: [docs]}")]
    Seed {
        #[arg(help = "Path to the fixture file")]
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
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
        Commands::Serve { port } => commands::serve::handle(port).await,
        Commands::Config => commands::config::handle(output_format),
        Commands::Token { sub, role, hours } => commands::token::handle(&sub, &role, hours, output_format),
        Commands::Seed { file } => commands::seed::handle(&file, output_format).await,
    }
}
