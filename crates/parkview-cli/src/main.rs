//! parkview - Main Entry Point

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use parkview_cli::{run, Cli};
use parkview_common::init_logging;
use parkview_config::ConfigLoader;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    init_logging(config.logging.to_logging_config())
        .map_err(|e| anyhow!("failed to initialise logging: {e}"))?;

    info!("Starting parkview {}", env!("CARGO_PKG_VERSION"));

    match run(&cli, &config).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            error!("Report failed: {:#}", e);
            Err(e)
        }
    }
}
