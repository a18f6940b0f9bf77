//! Configuration management for the querycount service.

use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use querycount_notify::NotifierConfig;
use serde::{Deserialize, Serialize};

use crate::server::RouterOptions;

const CONFIG_FILE: &str = "config.toml";

/// Environment variable name used by earlier deployments for the webhook.
const LEGACY_WEBHOOK_VAR: &str = "WEBHOOK_URL_HYBRIS_QUERY_COUNT";

/// Service configuration with defaults, file, and environment overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// `DATABASE_URL` has no default; loading fails without it.
///
/// # Example
///
/// ```no_run
/// use querycount_api::Config;
///
/// let config = Config::load().expect("Failed to load configuration");
/// println!("Server will bind to {}:{}", config.host, config.port);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Database
    /// PostgreSQL connection URL.
    ///
    /// Environment variable: `DATABASE_URL`
    #[serde(default)]
    pub database_url: String,
    /// Maximum number of database connections in the pool.
    ///
    /// Environment variable: `DATABASE_MAX_CONNECTIONS`
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,
    /// Database connection acquire timeout in seconds.
    ///
    /// Environment variable: `DATABASE_CONNECTION_TIMEOUT`
    #[serde(default = "default_acquire_timeout")]
    pub database_connection_timeout: u64,

    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port")]
    pub port: u16,
    /// HTTP request timeout in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// Directory served for paths outside the API.
    ///
    /// Environment variable: `STATIC_DIR`
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    // Webhook
    /// Endpoint notified on every new submission. Unset or blank disables
    /// notification.
    ///
    /// Environment variable: `WEBHOOK_URL` (or `WEBHOOK_URL_HYBRIS_QUERY_COUNT`)
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// HTTP timeout for the webhook call in seconds.
    ///
    /// Environment variable: `WEBHOOK_TIMEOUT_SECONDS`
    #[serde(default = "default_webhook_timeout")]
    pub webhook_timeout_seconds: u64,
    /// Maximum notifications waiting to be sent.
    ///
    /// Environment variable: `WEBHOOK_QUEUE_CAPACITY`
    #[serde(default = "default_webhook_queue_capacity")]
    pub webhook_queue_capacity: usize,

    // Logging
    /// Log level configuration.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

impl Config {
    /// Load configuration from defaults, config file, and environment variable
    /// overrides.
    ///
    /// # Errors
    ///
    /// Fails if a value cannot be parsed or validation fails, in particular
    /// when `DATABASE_URL` is missing.
    pub fn load() -> Result<Self> {
        let config: Self = Self::figment().extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the layered configuration source.
    pub fn figment() -> Figment {
        let legacy_webhook = Env::raw().filter_map(|key| {
            if key.as_str().eq_ignore_ascii_case(LEGACY_WEBHOOK_VAR) {
                Some("webhook_url".into())
            } else {
                None
            }
        });

        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(legacy_webhook)
            .merge(Env::prefixed(""))
    }

    /// Convert to the notifier's configuration.
    pub fn to_notifier_config(&self) -> NotifierConfig {
        NotifierConfig {
            webhook_url: self.webhook_url.clone(),
            timeout: Duration::from_secs(self.webhook_timeout_seconds),
            queue_capacity: self.webhook_queue_capacity,
            ..NotifierConfig::default()
        }
    }

    /// Convert to router options.
    pub fn to_router_options(&self) -> RouterOptions {
        RouterOptions {
            static_dir: self.static_dir.clone(),
            request_timeout: Duration::from_secs(self.request_timeout),
        }
    }

    /// Returns true when a non-blank webhook URL is configured.
    pub fn webhook_enabled(&self) -> bool {
        self.to_notifier_config().endpoint().is_some()
    }

    /// Parse server socket address from host and port configuration.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Get database URL with password masked for logging.
    pub fn database_url_masked(&self) -> String {
        if let Some(at_pos) = self.database_url.find('@') {
            if let Some(colon_pos) = self.database_url[..at_pos].rfind(':') {
                let scheme_end = self.database_url.find("://").map_or(0, |pos| pos + 3);
                if colon_pos >= scheme_end {
                    let mut masked = self.database_url.clone();
                    masked.replace_range(colon_pos + 1..at_pos, "***");
                    return masked;
                }
            }
        }
        self.database_url.clone()
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            anyhow::bail!("DATABASE_URL not set in environment");
        }

        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.database_max_connections == 0 {
            anyhow::bail!("database max_connections must be greater than 0");
        }

        if self.webhook_queue_capacity == 0 {
            anyhow::bail!("webhook_queue_capacity must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            database_max_connections: default_max_connections(),
            database_connection_timeout: default_acquire_timeout(),
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            static_dir: default_static_dir(),
            webhook_url: None,
            webhook_timeout_seconds: default_webhook_timeout(),
            webhook_queue_capacity: default_webhook_queue_capacity(),
            rust_log: default_log_level(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    10
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_request_timeout() -> u64 {
    30
}

fn default_static_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_webhook_timeout() -> u64 {
    querycount_notify::DEFAULT_TIMEOUT_SECONDS
}

fn default_webhook_queue_capacity() -> usize {
    querycount_notify::DEFAULT_QUEUE_CAPACITY
}

fn default_log_level() -> String {
    "info,querycount=debug,tower_http=debug".to_string()
}
