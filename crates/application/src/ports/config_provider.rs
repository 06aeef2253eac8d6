use std::sync::Arc;
use vigil_dns_domain::ResolverConfig;

pub type ConfigChangeHandler = Box<dyn Fn(&ResolverConfig) + Send + Sync>;

/// Source of immutable configuration snapshots.
///
/// Readers are wait-free; publication is atomic. Registered handlers run
/// synchronously on the publishing thread.
pub trait ConfigProvider: Send + Sync {
    fn config(&self) -> Arc<ResolverConfig>;

    /// Publish a replacement snapshot and notify change handlers.
    fn update_config(&self, config: ResolverConfig);

    fn register_change_handler(&self, handler: ConfigChangeHandler);
}
