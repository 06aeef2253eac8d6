//! Vigil DNS Infrastructure Layer
//!
//! Concrete implementations behind the application ports: the LRU host
//! cache, the event bus, the multiplexing query strategy with its wire
//! codec and transports, the factory registry, the resolver orchestration,
//! the in-process metrics sink, and the config manager.
pub mod cache;
pub mod config;
pub mod events;
pub mod metrics;
pub mod registry;
pub mod resolver;
pub mod strategy;

pub use cache::LruHostCache;
pub use config::ConfigManager;
pub use events::{AddressChangeEvent, EventBus};
pub use metrics::BasicMetrics;
pub use registry::FactoryRegistry;
pub use resolver::DnsResolver;
pub use strategy::MultiplexStrategy;
