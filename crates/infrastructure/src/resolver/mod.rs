//! Resolution pipeline orchestration: admission, cache lookup, dispatch,
//! retry with scheduled backoff, and address-change detection.

use crate::cache::LruHostCache;
use crate::events::{AddressChangeEvent, EventBus};
use crate::registry::FactoryRegistry;
use crate::strategy::MultiplexStrategy;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};
use vigil_dns_application::{
    ConfigProvider, HostCache, MetricsSink, QueryCallback, QueryStrategy,
};
use vigil_dns_domain::{
    is_valid_hostname, ResolveResult, ResolveStatus, ResolverConfig,
};

/// Factory names instantiated when no plugin override was requested.
const DEFAULT_STRATEGY_NAME: &str = "default";
const DEFAULT_CACHE_NAME: &str = "lru";

/// Error-kind label recorded for failed resolutions.
const ERROR_KIND_RESOLUTION: &str = "resolution_failure";

/// The resolution pipeline.
///
/// Long-lived singleton per embedding application. `resolve` returns
/// synchronously; the callback fires later from a runtime worker thread,
/// exactly once per call. The resolver exclusively owns its active
/// strategy and cache; completion adapters hold only a weak handle back,
/// so no reference cycle forms through the query path.
pub struct DnsResolver {
    config_provider: Arc<dyn ConfigProvider>,
    metrics: Option<Arc<dyn MetricsSink>>,
    events: Arc<EventBus>,
    registry: FactoryRegistry,
    strategy: Mutex<Option<Arc<dyn QueryStrategy>>>,
    cache: Mutex<Option<Arc<dyn HostCache>>>,
    runtime: Mutex<Option<Handle>>,
    in_flight: AtomicUsize,
    initialized: AtomicBool,
    active_strategy_name: Mutex<String>,
    active_cache_name: Mutex<String>,
    self_ref: Weak<Self>,
}

impl DnsResolver {
    pub fn new(
        config_provider: Arc<dyn ConfigProvider>,
        metrics: Option<Arc<dyn MetricsSink>>,
        events: Arc<EventBus>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            config_provider,
            metrics,
            events,
            registry: FactoryRegistry::new(),
            strategy: Mutex::new(None),
            cache: Mutex::new(None),
            runtime: Mutex::new(None),
            in_flight: AtomicUsize::new(0),
            initialized: AtomicBool::new(false),
            active_strategy_name: Mutex::new(DEFAULT_STRATEGY_NAME.to_string()),
            active_cache_name: Mutex::new(DEFAULT_CACHE_NAME.to_string()),
            self_ref: self_ref.clone(),
        })
    }

    /// Point the next `initialize` at different registered factories.
    pub fn set_active_plugins(&self, strategy_name: &str, cache_name: &str) {
        *self.active_strategy_name.lock().unwrap() = strategy_name.to_string();
        *self.active_cache_name.lock().unwrap() = cache_name.to_string();
    }

    /// Bring the resolver up. Idempotent under concurrent callers: exactly
    /// one caller performs the transition, later calls are no-ops.
    /// Returns false and stays uninitialized on any validation or
    /// construction failure.
    pub fn initialize(&self) -> bool {
        if self
            .initialized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("resolver already initialized");
            return true;
        }

        let config = self.config_provider.config();
        if let Err(e) = config.validate() {
            error!(error = %e, "invalid configuration");
            self.initialized.store(false, Ordering::Release);
            return false;
        }

        let runtime = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                error!(error = %e, "no async runtime available");
                self.initialized.store(false, Ordering::Release);
                return false;
            }
        };
        *self.runtime.lock().unwrap() = Some(runtime);

        let metrics = self.metrics.clone();
        self.registry.register_strategy_factory(
            DEFAULT_STRATEGY_NAME,
            Box::new(move |config| {
                MultiplexStrategy::new(Arc::new(config.clone()), metrics.clone())
                    .map(|s| s as Arc<dyn QueryStrategy>)
            }),
        );
        self.registry.register_cache_factory(
            DEFAULT_CACHE_NAME,
            Box::new(|config| Arc::new(LruHostCache::new(config)) as Arc<dyn HostCache>),
        );
        self.registry.set_plugin_config(config.plugins.clone());

        let strategy_name = self.active_strategy_name.lock().unwrap().clone();
        let strategy = match self.registry.create_strategy(&strategy_name, &config) {
            Ok(strategy) => strategy,
            Err(e) => {
                error!(name = %strategy_name, error = %e, "failed to create query strategy");
                self.initialized.store(false, Ordering::Release);
                return false;
            }
        };

        let cache = if config.cache.enabled {
            let cache_name = self.active_cache_name.lock().unwrap().clone();
            match self.registry.create_cache(&cache_name, &config.cache) {
                Ok(cache) => Some(cache),
                Err(e) => {
                    error!(name = %cache_name, error = %e, "failed to create cache");
                    strategy.shutdown();
                    self.initialized.store(false, Ordering::Release);
                    return false;
                }
            }
        } else {
            None
        };

        *self.strategy.lock().unwrap() = Some(strategy);
        *self.cache.lock().unwrap() = cache;

        let weak = self.self_ref.clone();
        self.config_provider
            .register_change_handler(Box::new(move |config| {
                if let Some(resolver) = weak.upgrade() {
                    resolver.handle_config_change(config);
                }
            }));

        info!("resolver initialized");
        true
    }

    /// Resolve a hostname, delivering the outcome through `callback`
    /// exactly once. Returns synchronously; cache hits and admission
    /// rejections invoke the callback on the calling thread, everything
    /// else fires from a runtime worker.
    pub fn resolve(
        &self,
        hostname: &str,
        callback: impl FnOnce(ResolveResult) + Send + 'static,
    ) {
        let callback: QueryCallback = Box::new(callback);

        if !self.initialized.load(Ordering::Acquire) {
            callback(ResolveResult::failure(
                ResolveStatus::NotInitialized,
                hostname,
            ));
            return;
        }

        if !is_valid_hostname(hostname) {
            callback(ResolveResult::failure(ResolveStatus::BadName, hostname));
            return;
        }

        let config = self.config_provider.config();
        if self.in_flight.load(Ordering::Acquire) >= config.max_concurrent_queries as usize {
            callback(ResolveResult::failure(ResolveStatus::Overloaded, hostname));
            return;
        }

        let admitted_at = Instant::now();
        self.events.publish_query_started(hostname);

        let cache = self.cache.lock().unwrap().clone();
        if let Some(addresses) = cache.and_then(|c| c.get(hostname)) {
            if let Some(metrics) = &self.metrics {
                metrics.record_cache_hit(hostname);
            }
            let mut result = ResolveResult::success(
                hostname,
                addresses.clone(),
                admitted_at.elapsed().as_millis() as u64,
            );
            result.from_cache = true;
            callback(result);
            self.events.publish_query_completed(hostname, &addresses, true);
            return;
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_cache_miss(hostname);
        }

        self.in_flight.fetch_add(1, Ordering::AcqRel);
        self.dispatch(hostname.to_string(), 0, admitted_at, callback);
    }

    /// Hand one attempt to the strategy, wiring its completion back into
    /// `on_result` through a weak resolver handle.
    fn dispatch(
        &self,
        hostname: String,
        retry_count: u32,
        admitted_at: Instant,
        callback: QueryCallback,
    ) {
        let strategy = self.strategy.lock().unwrap().clone();
        let Some(strategy) = strategy else {
            self.deliver_terminal(
                admitted_at,
                ResolveResult::failure(ResolveStatus::NotInitialized, hostname.as_str()),
                callback,
            );
            return;
        };

        let weak = self.self_ref.clone();
        let adapter: QueryCallback = Box::new(move |result| match weak.upgrade() {
            Some(resolver) => resolver.on_result(retry_count, admitted_at, result, callback),
            None => callback(result),
        });
        strategy.query(&hostname, adapter);
    }

    /// Completion of one attempt: detect address drift on success, decide
    /// between scheduled retry and terminal delivery on failure.
    fn on_result(
        &self,
        retry_count: u32,
        admitted_at: Instant,
        result: ResolveResult,
        callback: QueryCallback,
    ) {
        let config = self.config_provider.config();

        // Snapshot the previously cached list before any update.
        let cache = self.cache.lock().unwrap().clone();
        let old_addresses = cache
            .as_ref()
            .and_then(|c| c.get(&result.hostname))
            .unwrap_or_default();

        if result.is_success() && !result.addresses.is_empty() {
            if let Some(cache) = &cache {
                cache.update(&result.hostname, result.addresses.clone());
            }
            if old_addresses != result.addresses {
                let event = AddressChangeEvent::new(
                    result.hostname.clone(),
                    old_addresses,
                    result.addresses.clone(),
                    config.cache.ttl_ms,
                );
                self.events.publish_address_changed(&event);
            }
        } else if result.status.is_retryable() && retry_count + 1 < config.retry.max_attempts {
            let attempt = retry_count + 1;
            if let Some(metrics) = &self.metrics {
                metrics.record_retry(&result.hostname, attempt);
            }

            let delay_ms = (config.retry.base_delay_ms as u64)
                .saturating_mul(1 << (attempt - 1))
                .min(config.retry.max_delay_ms as u64);
            debug!(
                hostname = %result.hostname,
                attempt = attempt,
                delay_ms = delay_ms,
                "scheduling retry"
            );

            let runtime = self.runtime.lock().unwrap().clone();
            if let Some(runtime) = runtime {
                let weak = self.self_ref.clone();
                let hostname = result.hostname.clone();
                // Scheduled re-dispatch: the backoff rides the tokio timer
                // instead of blocking a worker thread.
                runtime.spawn(async move {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    match weak.upgrade() {
                        Some(resolver) if resolver.initialized.load(Ordering::Acquire) => {
                            resolver.dispatch(hostname, attempt, admitted_at, callback);
                        }
                        Some(resolver) => resolver.deliver_terminal(admitted_at, result, callback),
                        None => callback(result),
                    }
                });
                return;
            }
        }

        self.deliver_terminal(admitted_at, result, callback);
    }

    /// Final delivery: record metrics, release the admission slot, invoke
    /// the callback, publish query-completed — in that order.
    fn deliver_terminal(
        &self,
        admitted_at: Instant,
        mut result: ResolveResult,
        callback: QueryCallback,
    ) {
        result.elapsed_ms = admitted_at.elapsed().as_millis() as u64;

        if let Some(metrics) = &self.metrics {
            metrics.record_query(&result.hostname, result.elapsed_ms, result.is_success());
            if !result.is_success() {
                metrics.record_error(ERROR_KIND_RESOLUTION, &result.status.to_string());
            }
        }

        self.in_flight.fetch_sub(1, Ordering::AcqRel);

        let hostname = result.hostname.clone();
        let addresses = result.addresses.clone();
        let success = result.is_success();
        callback(result);
        self.events
            .publish_query_completed(&hostname, &addresses, success);
    }

    /// Drive strategy housekeeping. No-op when not initialized.
    pub fn process_events(&self) {
        if !self.initialized.load(Ordering::Acquire) {
            return;
        }
        let strategy = self.strategy.lock().unwrap().clone();
        if let Some(strategy) = strategy {
            strategy.process_events();
        }
    }

    /// Tear the resolver down: cancel outstanding queries, then clear the
    /// factory registry. Idempotent; `resolve` rejects synchronously with
    /// `NotInitialized` afterwards.
    pub fn shutdown(&self) {
        if self
            .initialized
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("resolver already shut down");
            return;
        }

        info!("shutting down resolver");
        let strategy = self.strategy.lock().unwrap().take();
        if let Some(strategy) = strategy {
            strategy.shutdown();
        }
        self.registry.clear();
        info!("resolver shutdown completed");
    }

    fn handle_config_change(&self, config: &ResolverConfig) {
        if let Err(e) = config.validate() {
            error!(error = %e, "rejecting invalid configuration update");
            return;
        }

        let strategy = self.strategy.lock().unwrap().clone();
        if let Some(strategy) = strategy {
            strategy.update_config(Arc::new(config.clone()));
        }
        self.registry.set_plugin_config(config.plugins.clone());
        info!("configuration update applied");
    }

    /// Publish a replacement configuration through the provider. Invalid
    /// configurations are logged and discarded; the previous snapshot
    /// stays in effect.
    pub fn update_config(&self, config: ResolverConfig) {
        if let Err(e) = config.validate() {
            error!(error = %e, "ignoring invalid configuration update");
            return;
        }
        self.config_provider.update_config(config);
    }

    pub fn config(&self) -> Arc<ResolverConfig> {
        self.config_provider.config()
    }

    pub fn cache(&self) -> Option<Arc<dyn HostCache>> {
        self.cache.lock().unwrap().clone()
    }

    pub fn metrics(&self) -> Option<Arc<dyn MetricsSink>> {
        self.metrics.clone()
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        self.events.clone()
    }

    pub fn registry(&self) -> &FactoryRegistry {
        &self.registry
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }
}

impl Drop for DnsResolver {
    fn drop(&mut self) {
        if self.is_initialized() {
            self.shutdown();
        }
    }
}
