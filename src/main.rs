use clap::Parser;
use tracing_subscriber::EnvFilter;

use admin_query_api::cli::{self, Cli};

#[tokio::main]
async fn main() {
    // Load .env if present so DATABASE_URL, JWT_SECRET, etc. reach the config singleton
    let _ = dotenvy::dotenv();

    let config = admin_query_api::config::config();
    let default_filter = if config.api.enable_request_logging {
        "admin_query_api=info,tower_http=debug"
    } else {
        "admin_query_api=info,tower_http=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    let cli = Cli::parse();

    if let Err(e) = cli::run(cli).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }
}
