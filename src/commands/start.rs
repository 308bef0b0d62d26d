use anyhow::Result;
use colored::Colorize;
use logvault::{config, init_tracing, server};
use std::path::Path;
use tracing::info;

/// Execute the start command
///
/// This will:
/// 1. Load configuration
/// 2. Initialize tracing with the configured level and format
/// 3. Start the server (blocks until shutdown)
pub async fn execute(config_path: &Path) -> Result<()> {
    println!("{}", "Starting logvault...".green());

    let cfg = config::load_config(config_path)?;
    init_tracing(&cfg.logging);

    info!(
        database = %config::redact_url(&cfg.database.url),
        cache = %config::redact_url(&cfg.cache.url),
        "Configuration loaded"
    );

    server::start_server(cfg).await?;

    Ok(())
}
