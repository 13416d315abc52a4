use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::Validate;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_SYNC_CONCURRENCY: usize = 5;
const DEFAULT_SYNC_WINDOW_DAYS: i64 = 1;
const DEFAULT_TOKEN_TTL_MARGIN_SECS: i64 = 60;

/// Upstream retail (point-of-sale) API configuration
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RetailApiConfig {
    /// Base URL of the retail API serving orders and reference data
    #[validate(url)]
    pub base_url: String,

    /// API key sent as a bearer credential on every request
    pub api_key: String,
}

/// External accounting system configuration
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AccountingApiConfig {
    /// Base URL of the accounting gateway
    #[validate(url)]
    pub base_url: String,

    /// Login username for token acquisition
    pub username: String,

    /// Login password for token acquisition
    pub password: String,

    /// Company code stamped on every submitted document header
    pub company_code: String,

    /// Seconds subtracted from the reported token lifetime before a
    /// refresh is considered due
    #[serde(default = "default_token_ttl_margin")]
    pub token_ttl_margin_secs: i64,
}

/// Batch synchronization tuning
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Number of orders processed concurrently. Bounds pressure on the
    /// accounting system, not internal contention.
    #[serde(default = "default_sync_concurrency")]
    #[validate(range(min = 1, max = 64))]
    pub concurrency: usize,

    /// How many days back the scheduled batch run reaches
    #[serde(default = "default_sync_window_days")]
    pub window_days: i64,

    /// Brands with a currently active gift-promotion program. Gift lines
    /// for these brands take the gift branch of the account-code chain.
    #[serde(default)]
    pub gift_promotion_brands: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            concurrency: default_sync_concurrency(),
            window_days: default_sync_window_days(),
            gift_promotion_brands: Vec::new(),
        }
    }
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL (audit log storage)
    pub database_url: String,

    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Upstream retail API
    #[validate]
    pub retail: RetailApiConfig,

    /// External accounting system
    #[validate]
    pub accounting: AccountingApiConfig,

    /// Batch synchronization tuning
    #[serde(default)]
    #[validate]
    pub sync: SyncConfig,
}

impl AppConfig {
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_sync_concurrency() -> usize {
    DEFAULT_SYNC_CONCURRENCY
}

fn default_sync_window_days() -> i64 {
    DEFAULT_SYNC_WINDOW_DAYS
}

fn default_token_ttl_margin() -> i64 {
    DEFAULT_TOKEN_TTL_MARGIN_SECS
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),
    #[error("configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

pub fn load_config() -> Result<AppConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("database_url", "sqlite://possync.db?mode=rwc")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    Ok(app_config)
}

pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = format!("possync_api={},tower_http=info", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let filter = EnvFilter::try_new(filter_directive)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    if json {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            database_url: "sqlite://possync_test.db?mode=rwc".into(),
            host: "127.0.0.1".into(),
            port: 18080,
            environment: "test".into(),
            log_level: "debug".into(),
            log_json: false,
            retail: RetailApiConfig {
                base_url: "https://pos.example.vn/api".into(),
                api_key: "test-key".into(),
            },
            accounting: AccountingApiConfig {
                base_url: "https://fast.example.vn/api".into(),
                username: "sync".into(),
                password: "secret".into(),
                company_code: "C100".into(),
                token_ttl_margin_secs: 60,
            },
            sync: SyncConfig::default(),
        }
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn invalid_retail_url_fails_validation() {
        let mut cfg = base_config();
        cfg.retail.base_url = "not a url".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn sync_defaults_are_bounded() {
        let sync = SyncConfig::default();
        assert_eq!(sync.concurrency, 5);
        assert_eq!(sync.window_days, 1);
        assert!(sync.gift_promotion_brands.is_empty());
    }
}
