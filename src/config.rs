use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::core::DEFAULT_SWIPE_LIMIT;
use crate::services::HISTORY_RETENTION;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

/// Where relation histories live
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Redis,
    /// Process-local histories; only correct for a single instance
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default)]
    pub backend: CacheBackend,
    pub redis_url: String,
    #[serde(default = "default_history_ttl_secs")]
    pub history_ttl_secs: u64,
    /// Use the server-side guarded append for quota checks
    #[serde(default = "default_true")]
    pub atomic_quota: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_swipe_limit")]
    pub swipe_limit: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            swipe_limit: default_swipe_limit(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_true() -> bool { true }
fn default_history_ttl_secs() -> u64 { HISTORY_RETENTION.as_secs() }
fn default_swipe_limit() -> u64 { DEFAULT_SWIPE_LIMIT }
fn default_request_timeout_secs() -> u64 { 10 }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SWIPE__)
    /// 5. DATABASE_URL and REDIS_URL
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SWIPE__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("SWIPE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_url_overrides(settings)?.try_deserialize()
    }
}

/// Conventional connection-string variables win over the config files
fn apply_url_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", url)?;
    }
    if let Ok(url) = env::var("REDIS_URL") {
        builder = builder.set_override("cache.redis_url", url)?;
    }

    builder.build()
}
