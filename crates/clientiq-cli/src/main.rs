//! ClientIQ command line front end.
//!
//! Dashboard data (KPI summary, distributions, clients) and bulk WhatsApp
//! template sendouts with message history.

mod cli;
mod commands;
mod config;
mod error;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::commands::App;
use crate::config::Config;

/// Filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "clientiq=info,sendout=info,crm_api=info,whatsapp_api=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    debug!(
        api = %config.crm.base_url,
        messaging = %config.messaging.base_url,
        "Starting clientiq"
    );

    let app = App::new(config);
    if let Err(e) = app.run(cli.command).await {
        error!(error = %e, "Command failed");
        return Err(e.into());
    }

    Ok(())
}
