use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use vigil_dns_application::ConfigProvider;
use vigil_dns_domain::{ResolverConfig, ServerConfig};
use vigil_dns_infrastructure::ConfigManager;

/// Load a config file when given, otherwise fall back to a default pool
/// of public recursive resolvers.
pub fn load_config(config_path: Option<&Path>) -> anyhow::Result<Arc<ConfigManager>> {
    let manager = ConfigManager::new(default_config());

    if let Some(path) = config_path {
        manager
            .load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?;
    }

    let config = manager.config();
    config.validate().context("validating configuration")?;

    info!(
        config_file = %config_path.map(|p| p.display().to_string()).unwrap_or_else(|| "default".into()),
        servers = config.servers.len(),
        cache_enabled = config.cache.enabled,
        "Configuration loaded"
    );

    Ok(manager)
}

fn default_config() -> ResolverConfig {
    ResolverConfig {
        servers: vec![ServerConfig::new("8.8.8.8"), ServerConfig::new("1.1.1.1")],
        ..ResolverConfig::default()
    }
}
