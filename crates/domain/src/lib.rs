//! Vigil DNS Domain Layer
pub mod config;
pub mod errors;
pub mod hostname;
pub mod resolution;
pub mod stats;

pub use config::{
    CacheConfig, ConfigError, MetricsConfig, PluginsConfig, ResolverConfig, RetryConfig,
    ServerConfig,
};
pub use errors::ResolverError;
pub use hostname::is_valid_hostname;
pub use resolution::{RecordKind, ResolveResult, ResolveStatus};
pub use stats::{HostStats, ResolverStats};
