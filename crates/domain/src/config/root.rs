use serde::{Deserialize, Serialize};

use super::cache::CacheConfig;
use super::errors::ConfigError;
use super::metrics::MetricsConfig;
use super::plugins::PluginsConfig;
use super::retry::RetryConfig;
use super::server::ServerConfig;

/// Full resolver configuration. Published as an immutable snapshot by the
/// config provider; components read it wait-free and never mutate it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub servers: Vec<ServerConfig>,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    #[serde(default)]
    pub plugins: PluginsConfig,

    /// Ceiling on a single logical resolution, per attempt.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u32,

    /// Admission ceiling on concurrently outstanding resolutions.
    #[serde(default = "default_max_concurrent_queries")]
    pub max_concurrent_queries: u32,

    /// When false only A records are requested.
    #[serde(default)]
    pub ipv6_enabled: bool,

    /// Consecutive server-attributable errors before a server is
    /// considered unhealthy.
    #[serde(default = "default_server_error_threshold")]
    pub server_error_threshold: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            cache: CacheConfig::default(),
            retry: RetryConfig::default(),
            metrics: MetricsConfig::default(),
            plugins: PluginsConfig::default(),
            query_timeout_ms: default_query_timeout_ms(),
            max_concurrent_queries: default_max_concurrent_queries(),
            ipv6_enabled: false,
            server_error_threshold: default_server_error_threshold(),
        }
    }
}

impl ResolverConfig {
    /// Enforce the bounds the resolver requires before it will initialize.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.servers.is_empty() {
            return Err(ConfigError::NoServers);
        }
        if !(100..=30_000).contains(&self.query_timeout_ms) {
            return Err(ConfigError::QueryTimeoutOutOfRange(self.query_timeout_ms));
        }
        if !(1..=10).contains(&self.retry.max_attempts) {
            return Err(ConfigError::RetryAttemptsOutOfRange(self.retry.max_attempts));
        }
        if self.retry.base_delay_ms < 10 {
            return Err(ConfigError::BaseDelayTooSmall(self.retry.base_delay_ms));
        }
        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            return Err(ConfigError::MaxDelayBelowBase {
                base: self.retry.base_delay_ms,
                max: self.retry.max_delay_ms,
            });
        }
        Ok(())
    }
}

fn default_query_timeout_ms() -> u32 {
    5000
}

fn default_max_concurrent_queries() -> u32 {
    100
}

fn default_server_error_threshold() -> u32 {
    10
}
