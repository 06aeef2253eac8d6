use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use vigil_dns_application::{HostCache, QueryStrategy};
use vigil_dns_domain::{CacheConfig, PluginsConfig, ResolverConfig, ResolverError};

pub type CacheFactory = Box<dyn Fn(&CacheConfig) -> Arc<dyn HostCache> + Send + Sync>;
pub type StrategyFactory =
    Box<dyn Fn(&ResolverConfig) -> Result<Arc<dyn QueryStrategy>, ResolverError> + Send + Sync>;

/// In-process mapping from names to cache and strategy factories.
///
/// Registration is idempotent by name, last write wins. The registry also
/// carries the plugin configuration record reserved for an external
/// dynamic-library loading facility; the core never loads libraries
/// itself.
#[derive(Default)]
pub struct FactoryRegistry {
    strategy_factories: Mutex<HashMap<String, StrategyFactory>>,
    cache_factories: Mutex<HashMap<String, CacheFactory>>,
    plugin_config: Mutex<PluginsConfig>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_strategy_factory(&self, name: &str, factory: StrategyFactory) {
        let mut factories = self.strategy_factories.lock().unwrap();
        if factories.insert(name.to_string(), factory).is_some() {
            info!(name = %name, "replaced query strategy factory");
        } else {
            info!(name = %name, "registered query strategy factory");
        }
    }

    pub fn register_cache_factory(&self, name: &str, factory: CacheFactory) {
        let mut factories = self.cache_factories.lock().unwrap();
        if factories.insert(name.to_string(), factory).is_some() {
            info!(name = %name, "replaced cache factory");
        } else {
            info!(name = %name, "registered cache factory");
        }
    }

    pub fn create_strategy(
        &self,
        name: &str,
        config: &ResolverConfig,
    ) -> Result<Arc<dyn QueryStrategy>, ResolverError> {
        let factories = self.strategy_factories.lock().unwrap();
        let factory = factories
            .get(name)
            .ok_or_else(|| ResolverError::FactoryNotFound(name.to_string()))?;
        let strategy = factory(config)?;
        debug!(name = %name, "created query strategy");
        Ok(strategy)
    }

    pub fn create_cache(
        &self,
        name: &str,
        config: &CacheConfig,
    ) -> Result<Arc<dyn HostCache>, ResolverError> {
        let factories = self.cache_factories.lock().unwrap();
        let factory = factories
            .get(name)
            .ok_or_else(|| ResolverError::FactoryNotFound(name.to_string()))?;
        let cache = factory(config);
        debug!(name = %name, "created cache");
        Ok(cache)
    }

    pub fn available_strategies(&self) -> Vec<String> {
        self.strategy_factories
            .lock()
            .unwrap()
            .keys()
            .cloned()
            .collect()
    }

    pub fn available_caches(&self) -> Vec<String> {
        self.cache_factories.lock().unwrap().keys().cloned().collect()
    }

    pub fn set_plugin_config(&self, config: PluginsConfig) {
        *self.plugin_config.lock().unwrap() = config;
    }

    pub fn plugin_config(&self) -> PluginsConfig {
        self.plugin_config.lock().unwrap().clone()
    }

    /// Drop every registered factory. Called on resolver shutdown.
    pub fn clear(&self) {
        self.strategy_factories.lock().unwrap().clear();
        self.cache_factories.lock().unwrap().clear();
    }
}
