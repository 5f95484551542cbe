//! purchase-portal binary
//!
//! Reads `.env` if present, then configuration from the environment:
//!   EMAIL_SERVICE / EMAIL_HOST / EMAIL_PORT / EMAIL_SECURE: transport
//!   EMAIL_USER / EMAIL_PASSWORD: SMTP login
//!   RECIPIENT_EMAIL: where notifications go
//!   EMAIL_TIMEOUT_SECS: per-send timeout (default: 30)
//!   PORT: listen port (default: 3001)
//!   FRONTEND_URL: logged at startup
//!   RUST_LOG: log filter

use clap::Parser;
use purchase_portal::cli::{run, Cli};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "purchase_portal=info,purchase_portal_core=info,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse()).await
}
