use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, warn};
use vigil_dns_domain::ServerConfig;

/// Rolling latency window length per server.
pub const LATENCY_WINDOW: usize = 100;

struct ServerHealth {
    healthy: bool,
    last_check: Instant,
    avg_latency_ms: u64,
    error_count: u32,
    latency_window: VecDeque<u64>,
}

impl ServerHealth {
    fn new() -> Self {
        Self {
            healthy: true,
            last_check: Instant::now(),
            avg_latency_ms: 0,
            error_count: 0,
            latency_window: VecDeque::with_capacity(LATENCY_WINDOW),
        }
    }
}

/// Per-server health scoring used to steer selection.
///
/// A success resets the error counter and folds the observed latency into
/// a rolling window; server-attributable failures increment the counter
/// until the server is marked unhealthy. When every server has collapsed,
/// selection resets all health state and falls back to the first
/// configured server.
pub struct HealthTracker {
    servers: Mutex<HashMap<String, ServerHealth>>,
}

impl HealthTracker {
    pub fn new(servers: &[ServerConfig]) -> Self {
        let tracker = Self {
            servers: Mutex::new(HashMap::new()),
        };
        tracker.ensure_servers(servers);
        tracker
    }

    /// Seed health records for enabled servers that do not have one yet.
    pub fn ensure_servers(&self, servers: &[ServerConfig]) {
        let mut state = self.servers.lock().unwrap();
        for server in servers.iter().filter(|s| s.enabled) {
            state.entry(server.key()).or_insert_with(ServerHealth::new);
        }
    }

    pub fn record_success(&self, server: &str, latency_ms: u64) {
        let mut state = self.servers.lock().unwrap();
        let health = state
            .entry(server.to_string())
            .or_insert_with(ServerHealth::new);

        health.latency_window.push_back(latency_ms);
        if health.latency_window.len() > LATENCY_WINDOW {
            health.latency_window.pop_front();
        }
        let total: u64 = health.latency_window.iter().sum();
        health.avg_latency_ms = total / health.latency_window.len() as u64;
        health.last_check = Instant::now();
        health.error_count = 0;
        health.healthy = true;
    }

    pub fn record_failure(&self, server: &str, error_threshold: u32) {
        let mut state = self.servers.lock().unwrap();
        let health = state
            .entry(server.to_string())
            .or_insert_with(ServerHealth::new);

        health.error_count += 1;
        health.last_check = Instant::now();
        if health.error_count > error_threshold {
            health.healthy = false;
            warn!(server = %server, errors = health.error_count, "server marked unhealthy");
        }
    }

    /// Pick the best server: `score = weight / (1 + avg_latency_ms)` over
    /// enabled healthy servers. On total collapse, reset everything and
    /// fall back to the first configured server.
    pub fn select<'a>(&self, servers: &'a [ServerConfig]) -> Option<&'a ServerConfig> {
        if servers.is_empty() {
            return None;
        }

        let mut candidates: SmallVec<[(usize, f64); 8]> = SmallVec::new();
        {
            let state = self.servers.lock().unwrap();
            for (index, server) in servers.iter().enumerate() {
                if !server.enabled {
                    continue;
                }
                let Some(health) = state.get(&server.key()) else {
                    continue;
                };
                if !health.healthy {
                    continue;
                }
                let score = server.weight as f64 / (1.0 + health.avg_latency_ms as f64);
                candidates.push((index, score));
            }
        }

        if candidates.is_empty() {
            debug!("no healthy servers, resetting health state");
            self.reset_all();
            return servers.first();
        }

        candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        Some(&servers[candidates[0].0])
    }

    pub fn reset_all(&self) {
        let mut state = self.servers.lock().unwrap();
        for health in state.values_mut() {
            health.healthy = true;
            health.error_count = 0;
        }
    }

    pub fn is_healthy(&self, server: &str) -> bool {
        self.servers
            .lock()
            .unwrap()
            .get(server)
            .map(|h| h.healthy)
            .unwrap_or(false)
    }

    pub fn avg_latency_ms(&self, server: &str) -> Option<u64> {
        self.servers
            .lock()
            .unwrap()
            .get(server)
            .map(|h| h.avg_latency_ms)
    }

    pub fn error_count(&self, server: &str) -> Option<u32> {
        self.servers
            .lock()
            .unwrap()
            .get(server)
            .map(|h| h.error_count)
    }
}
