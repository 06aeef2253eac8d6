use vigil_dns_domain::ResolverStats;

/// Counters and histograms recorded by the resolution pipeline.
///
/// Implementations must not block: every record method is called from hot
/// paths and completion callbacks.
pub trait MetricsSink: Send + Sync {
    /// One terminal resolution outcome; `duration_ms` spans all retries.
    fn record_query(&self, hostname: &str, duration_ms: u64, success: bool);

    fn record_cache_hit(&self, hostname: &str);

    fn record_cache_miss(&self, hostname: &str);

    fn record_error(&self, kind: &str, detail: &str);

    /// A scheduled retry; `attempt` is 1-based.
    fn record_retry(&self, hostname: &str, attempt: u32);

    fn record_server_latency(&self, server: &str, latency_ms: u64);

    fn stats(&self) -> ResolverStats;

    fn reset_stats(&self);
}
