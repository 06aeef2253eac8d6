use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::debug;
use vigil_dns_application::MetricsSink;
use vigil_dns_domain::{HostStats, ResolverStats};

/// Recent query durations kept for percentile rendering.
const MAX_DURATION_SAMPLES: usize = 1000;

/// Rolling latency samples kept per upstream server.
const MAX_SERVER_SAMPLES: usize = 100;

/// Retry attempts remembered per hostname.
const MAX_RETRY_HISTORY: usize = 100;

/// Streaming mean/variance/min/max (Welford's algorithm).
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn update(&mut self, value: f64) {
        self.count += 1;
        if self.count == 1 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        if self.count > 1 {
            self.m2 / (self.count - 1) as f64
        } else {
            0.0
        }
    }

    pub fn stddev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[derive(Default)]
struct HostRecord {
    query_count: u64,
    cache_hits: u64,
    cache_misses: u64,
    retry_count: u64,
    durations: RunningStats,
}

#[derive(Default)]
struct ServerRecord {
    samples: VecDeque<u64>,
    avg_latency_ms: f64,
}

/// In-process metrics sink: global counters on relaxed atomics, per-key
/// accounting in sharded maps so record calls never contend on one lock.
pub struct BasicMetrics {
    total_queries: AtomicU64,
    successful_queries: AtomicU64,
    failed_queries: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    total_retries: AtomicU64,

    query_stats: Mutex<RunningStats>,
    recent_durations: Mutex<VecDeque<f64>>,

    host_stats: DashMap<String, HostRecord, FxBuildHasher>,
    server_stats: DashMap<String, ServerRecord, FxBuildHasher>,
    error_counts: DashMap<String, u64, FxBuildHasher>,
    retry_attempts: DashMap<String, Vec<u32>, FxBuildHasher>,
}

impl BasicMetrics {
    pub fn new() -> Self {
        Self {
            total_queries: AtomicU64::new(0),
            successful_queries: AtomicU64::new(0),
            failed_queries: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            total_retries: AtomicU64::new(0),
            query_stats: Mutex::new(RunningStats::default()),
            recent_durations: Mutex::new(VecDeque::with_capacity(MAX_DURATION_SAMPLES)),
            host_stats: DashMap::with_hasher(FxBuildHasher::default()),
            server_stats: DashMap::with_hasher(FxBuildHasher::default()),
            error_counts: DashMap::with_hasher(FxBuildHasher::default()),
            retry_attempts: DashMap::with_hasher(FxBuildHasher::default()),
        }
    }

    /// Text exposition of the counters and recent-duration quantiles.
    pub fn prometheus_render(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let _ = write!(
            out,
            "# TYPE dns_total_queries counter\n\
             dns_total_queries {}\n\
             # TYPE dns_successful_queries counter\n\
             dns_successful_queries {}\n\
             # TYPE dns_failed_queries counter\n\
             dns_failed_queries {}\n\
             # TYPE dns_cache_hits counter\n\
             dns_cache_hits {}\n\
             # TYPE dns_cache_misses counter\n\
             dns_cache_misses {}\n\
             # TYPE dns_total_retries counter\n\
             dns_total_retries {}\n",
            self.total_queries.load(Ordering::Relaxed),
            self.successful_queries.load(Ordering::Relaxed),
            self.failed_queries.load(Ordering::Relaxed),
            self.cache_hits.load(Ordering::Relaxed),
            self.cache_misses.load(Ordering::Relaxed),
            self.total_retries.load(Ordering::Relaxed),
        );

        let durations = self.recent_durations.lock().unwrap();
        if !durations.is_empty() {
            let mut sorted: Vec<f64> = durations.iter().copied().collect();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let quantile = |q: f64| sorted[((sorted.len() - 1) as f64 * q) as usize];
            let _ = write!(
                out,
                "# TYPE dns_query_time_ms histogram\n\
                 dns_query_time_ms{{quantile=\"0.50\"}} {}\n\
                 dns_query_time_ms{{quantile=\"0.90\"}} {}\n\
                 dns_query_time_ms{{quantile=\"0.99\"}} {}\n\
                 dns_query_time_ms_count {}\n",
                quantile(0.5),
                quantile(0.9),
                quantile(0.99),
                sorted.len(),
            );
        }
        drop(durations);

        let _ = writeln!(out, "# TYPE dns_server_latency_ms gauge");
        for entry in self.server_stats.iter() {
            let _ = writeln!(
                out,
                "dns_server_latency_ms{{server=\"{}\"}} {}",
                entry.key(),
                entry.value().avg_latency_ms
            );
        }

        let _ = writeln!(out, "# TYPE dns_errors counter");
        for entry in self.error_counts.iter() {
            let _ = writeln!(out, "dns_errors{{type=\"{}\"}} {}", entry.key(), entry.value());
        }

        out
    }
}

impl Default for BasicMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSink for BasicMetrics {
    fn record_query(&self, hostname: &str, duration_ms: u64, success: bool) {
        self.total_queries.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_queries.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_queries.fetch_add(1, Ordering::Relaxed);
        }

        let duration = duration_ms as f64;
        self.query_stats.lock().unwrap().update(duration);

        {
            let mut durations = self.recent_durations.lock().unwrap();
            durations.push_back(duration);
            if durations.len() > MAX_DURATION_SAMPLES {
                durations.pop_front();
            }
        }

        let mut host = self.host_stats.entry(hostname.to_string()).or_default();
        host.query_count += 1;
        host.durations.update(duration);

        debug!(
            hostname = %hostname,
            duration_ms = duration_ms,
            success = success,
            "recorded query"
        );
    }

    fn record_cache_hit(&self, hostname: &str) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
        self.host_stats
            .entry(hostname.to_string())
            .or_default()
            .cache_hits += 1;
    }

    fn record_cache_miss(&self, hostname: &str) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        self.host_stats
            .entry(hostname.to_string())
            .or_default()
            .cache_misses += 1;
    }

    fn record_error(&self, kind: &str, detail: &str) {
        *self.error_counts.entry(kind.to_string()).or_insert(0) += 1;
        debug!(kind = %kind, detail = %detail, "recorded error");
    }

    fn record_retry(&self, hostname: &str, attempt: u32) {
        self.total_retries.fetch_add(1, Ordering::Relaxed);
        self.host_stats
            .entry(hostname.to_string())
            .or_default()
            .retry_count += 1;

        let mut attempts = self.retry_attempts.entry(hostname.to_string()).or_default();
        attempts.push(attempt);
        if attempts.len() > MAX_RETRY_HISTORY {
            let excess = attempts.len() - MAX_RETRY_HISTORY;
            attempts.drain(..excess);
        }
    }

    fn record_server_latency(&self, server: &str, latency_ms: u64) {
        let mut record = self.server_stats.entry(server.to_string()).or_default();
        record.samples.push_back(latency_ms);
        if record.samples.len() > MAX_SERVER_SAMPLES {
            record.samples.pop_front();
        }
        let total: u64 = record.samples.iter().sum();
        record.avg_latency_ms = total as f64 / record.samples.len() as f64;
    }

    fn stats(&self) -> ResolverStats {
        let cache_hits = self.cache_hits.load(Ordering::Relaxed);
        let cache_misses = self.cache_misses.load(Ordering::Relaxed);
        let lookups = cache_hits + cache_misses;

        let query_stats = self.query_stats.lock().unwrap().clone();

        let mut stats = ResolverStats {
            total_queries: self.total_queries.load(Ordering::Relaxed),
            successful_queries: self.successful_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            cache_hits,
            cache_misses,
            total_retries: self.total_retries.load(Ordering::Relaxed),
            cache_hit_rate: if lookups > 0 {
                cache_hits as f64 / lookups as f64
            } else {
                0.0
            },
            ..ResolverStats::default()
        };

        if query_stats.count() > 0 {
            stats.avg_query_time_ms = query_stats.mean();
            stats.query_time_stddev_ms = query_stats.stddev();
            stats.min_query_time_ms = query_stats.min();
            stats.max_query_time_ms = query_stats.max();
        }

        for entry in self.server_stats.iter() {
            stats
                .server_latencies
                .insert(entry.key().clone(), entry.value().avg_latency_ms);
        }
        for entry in self.error_counts.iter() {
            stats.error_counts.insert(entry.key().clone(), *entry.value());
        }
        for entry in self.host_stats.iter() {
            let record = entry.value();
            stats.host_stats.insert(
                entry.key().clone(),
                HostStats {
                    query_count: record.query_count,
                    cache_hits: record.cache_hits,
                    cache_misses: record.cache_misses,
                    retry_count: record.retry_count,
                    avg_resolution_time_ms: record.durations.mean(),
                },
            );
        }

        stats
    }

    fn reset_stats(&self) {
        self.total_queries.store(0, Ordering::Relaxed);
        self.successful_queries.store(0, Ordering::Relaxed);
        self.failed_queries.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
        self.total_retries.store(0, Ordering::Relaxed);
        *self.query_stats.lock().unwrap() = RunningStats::default();
        self.recent_durations.lock().unwrap().clear();
        self.host_stats.clear();
        self.server_stats.clear();
        self.error_counts.clear();
        self.retry_attempts.clear();
        debug!("all metrics reset");
    }
}
