#![allow(dead_code)]

pub mod dns_server_mock;
pub mod recording_metrics;
pub mod scripted_strategy;

pub use dns_server_mock::{MockDnsServer, MockMode};
pub use recording_metrics::RecordingMetrics;
pub use scripted_strategy::{ScriptedOutcome, ScriptedStrategy};

use std::sync::Arc;
use vigil_dns_domain::{ResolverConfig, ServerConfig};

/// A config that passes validation and points at a reserved local port
/// nothing listens on.
pub fn test_config() -> ResolverConfig {
    ResolverConfig {
        servers: vec![ServerConfig::new("127.0.0.1")],
        ..ResolverConfig::default()
    }
}

pub fn test_config_arc() -> Arc<ResolverConfig> {
    Arc::new(test_config())
}
