use serde::Serialize;
use std::collections::HashMap;

/// Per-hostname accounting kept by the metrics sink.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HostStats {
    pub query_count: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub retry_count: u64,
    pub avg_resolution_time_ms: f64,
}

/// Aggregate snapshot returned by `MetricsSink::stats`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolverStats {
    pub total_queries: u64,
    pub successful_queries: u64,
    pub failed_queries: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub total_retries: u64,

    /// `cache_hits / (cache_hits + cache_misses)`, zero with no lookups.
    pub cache_hit_rate: f64,

    pub avg_query_time_ms: f64,
    pub query_time_stddev_ms: f64,
    pub min_query_time_ms: f64,
    pub max_query_time_ms: f64,

    /// Rolling average latency per upstream server, keyed by "address:port".
    pub server_latencies: HashMap<String, f64>,

    /// Error occurrences keyed by error kind.
    pub error_counts: HashMap<String, u64>,

    pub host_stats: HashMap<String, HostStats>,
}
