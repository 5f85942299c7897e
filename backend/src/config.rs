//! Configuration management for the stock control service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with STOCKCTL__ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT verification configuration
    pub jwt: JwtConfig,

    /// Log output configuration
    pub logging: LoggingConfig,

    /// Report and listing limits
    pub reports: ReportsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Seconds to wait for a pooled connection
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Shared secret used to verify bearer tokens issued by the auth provider
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub filter: String,

    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportsConfig {
    /// Page size for movement listings when the client sends none
    pub default_page_size: i64,

    /// Upper bound for a client supplied page size
    pub max_page_size: i64,

    /// Number of low-stock products listed on the dashboard
    pub dashboard_alert_limit: i64,

    /// Number of alerts returned by the alert listing
    pub alert_list_limit: i64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("STOCKCTL_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default(
                "logging.filter",
                "stockctl_server=debug,tower_http=debug,sqlx=warn",
            )?
            .set_default("logging.json", false)?
            .set_default("reports.default_page_size", 50)?
            .set_default("reports.max_page_size", 500)?
            .set_default("reports.dashboard_alert_limit", 5)?
            .set_default("reports.alert_list_limit", 100)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (STOCKCTL prefix)
            .add_source(
                Environment::with_prefix("STOCKCTL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_need_only_secrets() {
        let built = config::Config::builder()
            .set_default("environment", "test")
            .unwrap()
            .set_default("server.port", 3000)
            .unwrap()
            .set_default("server.host", "127.0.0.1")
            .unwrap()
            .set_default("database.url", "postgres://localhost/stock")
            .unwrap()
            .set_default("database.max_connections", 4)
            .unwrap()
            .set_default("database.min_connections", 1)
            .unwrap()
            .set_default("database.acquire_timeout_secs", 5)
            .unwrap()
            .set_default("jwt.secret", "secret")
            .unwrap()
            .set_default("logging.filter", "info")
            .unwrap()
            .set_default("logging.json", true)
            .unwrap()
            .set_default("reports.default_page_size", 50)
            .unwrap()
            .set_default("reports.max_page_size", 500)
            .unwrap()
            .set_default("reports.dashboard_alert_limit", 5)
            .unwrap()
            .set_default("reports.alert_list_limit", 100)
            .unwrap()
            .build()
            .unwrap();

        let config: Config = built.try_deserialize().unwrap();
        assert!(!config.is_development());
        assert_eq!(config.reports.dashboard_alert_limit, 5);
        assert!(config.logging.json);
    }
}
