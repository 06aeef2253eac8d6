use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use vigil_dns_application::MetricsSink;
use vigil_dns_domain::ResolverStats;

/// Metrics sink that remembers every call for assertions.
#[derive(Default)]
pub struct RecordingMetrics {
    pub queries: Mutex<Vec<(String, u64, bool)>>,
    pub retries: Mutex<Vec<(String, u32)>>,
    pub errors: Mutex<Vec<(String, String)>>,
    pub server_latencies: Mutex<Vec<(String, u64)>>,
    pub cache_hits: AtomicUsize,
    pub cache_misses: AtomicUsize,
}

impl RecordingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn retry_attempts(&self) -> Vec<u32> {
        self.retries.lock().unwrap().iter().map(|(_, a)| *a).collect()
    }
}

impl MetricsSink for RecordingMetrics {
    fn record_query(&self, hostname: &str, duration_ms: u64, success: bool) {
        self.queries
            .lock()
            .unwrap()
            .push((hostname.to_string(), duration_ms, success));
    }

    fn record_cache_hit(&self, _hostname: &str) {
        self.cache_hits.fetch_add(1, Ordering::SeqCst);
    }

    fn record_cache_miss(&self, _hostname: &str) {
        self.cache_misses.fetch_add(1, Ordering::SeqCst);
    }

    fn record_error(&self, kind: &str, detail: &str) {
        self.errors
            .lock()
            .unwrap()
            .push((kind.to_string(), detail.to_string()));
    }

    fn record_retry(&self, hostname: &str, attempt: u32) {
        self.retries
            .lock()
            .unwrap()
            .push((hostname.to_string(), attempt));
    }

    fn record_server_latency(&self, server: &str, latency_ms: u64) {
        self.server_latencies
            .lock()
            .unwrap()
            .push((server.to_string(), latency_ms));
    }

    fn stats(&self) -> ResolverStats {
        ResolverStats::default()
    }

    fn reset_stats(&self) {
        self.queries.lock().unwrap().clear();
        self.retries.lock().unwrap().clear();
        self.errors.lock().unwrap().clear();
        self.server_latencies.lock().unwrap().clear();
        self.cache_hits.store(0, Ordering::SeqCst);
        self.cache_misses.store(0, Ordering::SeqCst);
    }
}
