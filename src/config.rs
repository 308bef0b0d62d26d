use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// `memory://` or a `sqlite:` URL
    pub url: String,
    pub sweep_interval_seconds: u64,
    /// Key cap for the in-process cache
    pub max_entries: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    pub enabled: bool,
}

/// Load configuration from defaults, an optional file and the environment.
///
/// Precedence, lowest first: built-in defaults, the TOML file at `path`
/// (skipped when missing), `LOGVAULT_*` variables (`__` separates nesting,
/// e.g. `LOGVAULT_SERVER__PORT`), then `DATABASE_URL` and `CACHE_URL`.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("server.body_limit_bytes", 1024 * 1024)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("database.url", "sqlite://logvault.db")?
        .set_default("database.max_connections", 5)?
        .set_default("cache.url", "memory://")?
        .set_default("cache.sweep_interval_seconds", 300)?
        .set_default("cache.max_entries", 10_000)?
        .set_default("metrics.enabled", true)?
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("LOGVAULT")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
        .set_override_option("cache.url", std::env::var("CACHE_URL").ok())?
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        anyhow::bail!("Server port must be greater than 0");
    }

    if cfg.server.body_limit_bytes == 0 {
        anyhow::bail!("Request body limit must be greater than 0");
    }

    match cfg.logging.format.as_str() {
        "text" | "json" => {}
        other => anyhow::bail!("Invalid log format '{}': expected 'text' or 'json'", other),
    }

    if cfg.database.url.trim().is_empty() {
        anyhow::bail!("Database URL cannot be empty");
    }

    if cfg.database.max_connections == 0 {
        anyhow::bail!("Database max_connections must be greater than 0");
    }

    if !crate::cache::is_supported_url(&cfg.cache.url) {
        anyhow::bail!(
            "Unsupported cache URL '{}': expected 'memory://' or a 'sqlite:' URL",
            cfg.cache.url
        );
    }

    if cfg.cache.sweep_interval_seconds == 0 {
        anyhow::bail!("Cache sweep interval must be greater than 0");
    }

    if cfg.cache.max_entries == 0 {
        anyhow::bail!("Cache max_entries must be greater than 0");
    }

    Ok(())
}

/// Hide the password part of a connection string for display
pub fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.split_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _password)) => format!("{}://{}:***@{}", scheme, user, host),
        None => url.to_string(),
    }
}
