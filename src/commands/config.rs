use anyhow::Result;
use colored::Colorize;
use logvault::config::{self, Config};
use std::path::Path;

/// Execute the config show command
///
/// Displays the effective configuration with connection credentials masked
pub fn show(config_path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());

    let cfg = config::load_config(config_path)?;
    let sanitized = sanitize_secrets(&cfg);

    println!("{}", "Current Configuration:".green().bold());
    println!();

    let toml_string = toml::to_string_pretty(&sanitized)?;
    println!("{}", toml_string);

    Ok(())
}

/// Execute the config validate command
pub fn validate(config_path: &Path) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());

    let cfg = config::load_config(config_path)?;

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Listen: {}:{}", cfg.server.host, cfg.server.port);
    println!("  Database: {}", config::redact_url(&cfg.database.url));
    println!("  Cache: {}", config::redact_url(&cfg.cache.url));
    println!(
        "  Metrics: {}",
        if cfg.metrics.enabled { "enabled" } else { "disabled" }
    );

    Ok(())
}

/// Mask credentials in connection strings for safe display
fn sanitize_secrets(cfg: &Config) -> Config {
    let mut sanitized = cfg.clone();
    sanitized.database.url = config::redact_url(&cfg.database.url);
    sanitized.cache.url = config::redact_url(&cfg.cache.url);
    sanitized
}
