use std::sync::Arc;
use vigil_dns_domain::{ResolveResult, ResolverConfig};

/// Completion callback handed to a strategy alongside a hostname.
///
/// Invoked exactly once per `query` call, possibly from a worker thread
/// that is not the caller's.
pub type QueryCallback = Box<dyn FnOnce(ResolveResult) + Send + 'static>;

/// The replaceable abstraction that turns a hostname into an address list
/// via an upstream DNS protocol, independent of caching or retry policy.
///
/// Implementations are internally thread-safe and accept unbounded
/// concurrent `query` calls on a single instance.
pub trait QueryStrategy: Send + Sync {
    /// Dispatch an asynchronous lookup. Never blocks; the callback fires
    /// when the underlying query completes, times out, or is cancelled.
    fn query(&self, hostname: &str, callback: QueryCallback);

    /// Advance outstanding work and reap completed query contexts.
    /// Safe to call at any time, including before initialization.
    fn process_events(&self);

    /// Cancel all outstanding queries, delivering `Cancelled` to every
    /// callback that has not yet fired. Idempotent.
    fn shutdown(&self);

    fn is_initialized(&self) -> bool;

    /// Accept a validated replacement configuration snapshot.
    fn update_config(&self, config: Arc<ResolverConfig>);
}
