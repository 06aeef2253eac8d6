mod helpers;

use helpers::{test_config, ScriptedStrategy};
use std::net::IpAddr;
use std::sync::Arc;
use vigil_dns_application::{HostCache, QueryStrategy};
use vigil_dns_domain::{CacheConfig, PluginsConfig, ResolverError};
use vigil_dns_infrastructure::{FactoryRegistry, LruHostCache};

fn addr(a: &str) -> Vec<IpAddr> {
    vec![a.parse().unwrap()]
}

#[test]
fn missing_factory_is_an_error() {
    let registry = FactoryRegistry::new();
    let result = registry.create_cache("nope", &CacheConfig::default());
    assert!(matches!(result, Err(ResolverError::FactoryNotFound(name)) if name == "nope"));

    let result = registry.create_strategy("nope", &test_config());
    assert!(matches!(result, Err(ResolverError::FactoryNotFound(_))));
}

#[test]
fn cache_factory_round_trip() {
    let registry = FactoryRegistry::new();
    registry.register_cache_factory(
        "lru",
        Box::new(|config| Arc::new(LruHostCache::new(config)) as Arc<dyn HostCache>),
    );

    let cache = registry.create_cache("lru", &CacheConfig::default()).unwrap();
    cache.update("example.com", addr("10.0.0.1"));
    assert_eq!(cache.get("example.com"), Some(addr("10.0.0.1")));
}

#[test]
fn registration_is_last_write_wins() {
    let registry = FactoryRegistry::new();

    // First factory: capacity 1; replacement: capacity 2. Creating after
    // the replacement must build the capacity-2 cache.
    registry.register_cache_factory(
        "lru",
        Box::new(|_| {
            Arc::new(LruHostCache::new(&CacheConfig {
                max_size: 1,
                ..CacheConfig::default()
            })) as Arc<dyn HostCache>
        }),
    );
    registry.register_cache_factory(
        "lru",
        Box::new(|_| {
            Arc::new(LruHostCache::new(&CacheConfig {
                max_size: 2,
                ..CacheConfig::default()
            })) as Arc<dyn HostCache>
        }),
    );

    let cache = registry.create_cache("lru", &CacheConfig::default()).unwrap();
    cache.update("a.example", addr("10.0.0.1"));
    cache.update("b.example", addr("10.0.0.2"));
    assert_eq!(cache.len(), 2);
}

#[test]
fn strategy_factory_dispatches_by_name() {
    let registry = FactoryRegistry::new();
    let scripted = ScriptedStrategy::new(vec![]);
    let handle = scripted.clone();
    registry.register_strategy_factory(
        "scripted",
        Box::new(move |_| Ok(handle.clone() as Arc<dyn QueryStrategy>)),
    );

    let strategy = registry.create_strategy("scripted", &test_config()).unwrap();
    assert!(strategy.is_initialized());
    assert_eq!(scripted.dispatches(), 0);
}

#[test]
fn available_names_reflect_registrations() {
    let registry = FactoryRegistry::new();
    registry.register_cache_factory(
        "lru",
        Box::new(|config| Arc::new(LruHostCache::new(config)) as Arc<dyn HostCache>),
    );
    assert_eq!(registry.available_caches(), vec!["lru".to_string()]);
    assert!(registry.available_strategies().is_empty());

    registry.clear();
    assert!(registry.available_caches().is_empty());
}

#[test]
fn plugin_config_record_is_held_for_external_loaders() {
    let registry = FactoryRegistry::new();
    registry.set_plugin_config(PluginsConfig {
        auto_load: true,
        config_path: "/etc/vigil/plugins".into(),
        allowed_plugins: vec!["custom".into()],
        reload_interval_ms: 1000,
    });

    let config = registry.plugin_config();
    assert!(config.auto_load);
    assert_eq!(config.config_path, "/etc/vigil/plugins");
    assert_eq!(config.allowed_plugins, vec!["custom".to_string()]);
    assert_eq!(config.reload_interval_ms, 1000);
}
