pub mod config_provider;
pub mod host_cache;
pub mod metrics;
pub mod query_strategy;

pub use config_provider::{ConfigChangeHandler, ConfigProvider};
pub use host_cache::HostCache;
pub use metrics::MetricsSink;
pub use query_strategy::{QueryCallback, QueryStrategy};
