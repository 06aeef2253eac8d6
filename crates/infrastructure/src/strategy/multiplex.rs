use super::context::{QueryContext, QueryId};
use super::health::HealthTracker;
use super::transport::Transport;
use super::wire::{DnsResponse, MessageBuilder, ResponseParser};
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};
use vigil_dns_application::{MetricsSink, QueryCallback, QueryStrategy};
use vigil_dns_domain::{
    RecordKind, ResolveResult, ResolveStatus, ResolverConfig, ResolverError, ServerConfig,
};

/// Floor for the TCP retry budget after a truncated UDP answer.
const TRUNCATION_RETRY_FLOOR: Duration = Duration::from_millis(500);

/// Default query strategy: multiplexes lookups over the configured server
/// pool, steering each query to the healthiest server by weighted latency
/// score.
///
/// The underlying asynchronous channel is the tokio runtime captured at
/// construction: each query runs as a spawned task that drives one UDP
/// exchange (with TCP fallback on truncation) per requested family.
/// Completion callbacks therefore run on runtime worker threads. Query
/// tasks hold only a weak handle back to the strategy, so dropping the
/// strategy never races a completion.
pub struct MultiplexStrategy {
    config: ArcSwap<ResolverConfig>,
    runtime: Handle,
    health: HealthTracker,
    transports: Mutex<HashMap<SocketAddr, Arc<Transport>>>,
    contexts: Mutex<HashMap<QueryId, Arc<QueryContext>>>,
    next_id: AtomicU64,
    initialized: AtomicBool,
    metrics: Option<Arc<dyn MetricsSink>>,
    self_ref: Weak<Self>,
}

impl MultiplexStrategy {
    /// Set up the strategy for the given configuration snapshot.
    ///
    /// Fails when no tokio runtime is reachable (the asynchronous channel
    /// cannot be created) or when no enabled server has a usable address.
    pub fn new(
        config: Arc<ResolverConfig>,
        metrics: Option<Arc<dyn MetricsSink>>,
    ) -> Result<Arc<Self>, ResolverError> {
        let runtime =
            Handle::try_current().map_err(|e| ResolverError::RuntimeUnavailable(e.to_string()))?;

        let usable = config
            .servers
            .iter()
            .filter(|s| s.enabled)
            .filter(|s| s.socket_addr().is_ok())
            .count();
        if usable == 0 {
            return Err(ResolverError::NoUsableServers);
        }

        let health = HealthTracker::new(&config.servers);

        let strategy = Arc::new_cyclic(|self_ref| Self {
            config: ArcSwap::new(config),
            runtime,
            health,
            transports: Mutex::new(HashMap::new()),
            contexts: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            initialized: AtomicBool::new(true),
            metrics,
            self_ref: self_ref.clone(),
        });

        info!(servers = usable, "multiplex strategy initialized");
        Ok(strategy)
    }

    pub fn health(&self) -> &HealthTracker {
        &self.health
    }

    pub fn in_flight(&self) -> usize {
        self.contexts.lock().unwrap().len()
    }

    fn transport_for(&self, addr: SocketAddr) -> Arc<Transport> {
        let mut transports = self.transports.lock().unwrap();
        transports
            .entry(addr)
            .or_insert_with(|| Arc::new(Transport::udp(addr)))
            .clone()
    }

    fn select_server(&self, config: &ResolverConfig) -> Option<ServerConfig> {
        self.health.select(&config.servers).cloned()
    }

    /// One UDP exchange for a single record family, retried over TCP
    /// within the remaining budget when the answer was truncated.
    async fn query_family(
        transport: &Transport,
        hostname: &str,
        kind: RecordKind,
        timeout: Duration,
    ) -> Result<DnsResponse, ResolverError> {
        let start = Instant::now();
        let query_bytes = MessageBuilder::build_query(hostname, kind)?;

        let response = transport.send(&query_bytes, timeout).await?;
        let parsed = ResponseParser::parse(&response.bytes)?;

        if parsed.truncated {
            let server = transport.server_addr();
            debug!(server = %server, "response truncated, retrying via TCP");

            let remaining = timeout
                .checked_sub(start.elapsed())
                .unwrap_or(TRUNCATION_RETRY_FLOOR);
            let tcp = Transport::tcp(server);
            let tcp_response = tcp.send(&query_bytes, remaining).await?;
            return ResponseParser::parse(&tcp_response.bytes);
        }

        Ok(parsed)
    }

    /// Resolve both address families when IPv6 is enabled, merging the
    /// answers; A-only otherwise.
    async fn run_query(
        transport: Arc<Transport>,
        hostname: String,
        ipv6_enabled: bool,
        timeout: Duration,
    ) -> Result<DnsResponse, ResolverError> {
        let v4 = Self::query_family(&transport, &hostname, RecordKind::A, timeout);

        if !ipv6_enabled {
            return v4.await;
        }

        let v6 = Self::query_family(&transport, &hostname, RecordKind::Aaaa, timeout);
        let (r4, r6) = futures::join!(v4, v6);
        match (r4, r6) {
            (Ok(mut a), Ok(aaaa)) => {
                let a_is_nodata = a.is_nodata();
                let aaaa_is_nodata = aaaa.is_nodata();
                let aaaa_rcode = aaaa.rcode;
                a.addresses.extend(aaaa.addresses);
                if a_is_nodata && !aaaa_is_nodata {
                    a.rcode = aaaa_rcode;
                }
                Ok(a)
            }
            (Ok(a), Err(_)) => Ok(a),
            (Err(_), Ok(aaaa)) => Ok(aaaa),
            (Err(e), Err(_)) => Err(e),
        }
    }

    fn handle_result(
        &self,
        ctx: &QueryContext,
        server_key: &str,
        outcome: Result<DnsResponse, ResolverError>,
    ) {
        let latency_ms = ctx.started_at.elapsed().as_millis() as u64;
        let config = self.config.load();

        let (status, addresses) = match outcome {
            Ok(response) => {
                if response.is_nxdomain() {
                    (ResolveStatus::NotFound, Vec::new())
                } else if response.is_server_error() {
                    (ResolveStatus::ServerFail, Vec::new())
                } else if response.is_nodata() {
                    (ResolveStatus::NoData, Vec::new())
                } else {
                    (ResolveStatus::Success, response.addresses)
                }
            }
            Err(error) => {
                debug!(hostname = %ctx.hostname, error = %error, "query failed");
                (status_for_error(&error), Vec::new())
            }
        };

        if status == ResolveStatus::Success {
            self.health.record_success(server_key, latency_ms);
            if let Some(metrics) = &self.metrics {
                metrics.record_server_latency(server_key, latency_ms);
            }
        } else if status.is_server_attributable() {
            self.health
                .record_failure(server_key, config.server_error_threshold);
        }

        let result = ResolveResult {
            status,
            hostname: ctx.hostname.clone(),
            addresses,
            elapsed_ms: latency_ms,
            error: (status != ResolveStatus::Success).then(|| status.to_string()),
            from_cache: false,
        };
        ctx.complete(result);
    }
}

impl QueryStrategy for MultiplexStrategy {
    fn query(&self, hostname: &str, callback: QueryCallback) {
        if !self.is_initialized() {
            callback(ResolveResult::failure(
                ResolveStatus::NotInitialized,
                hostname,
            ));
            return;
        }

        let config = self.config.load_full();
        let Some(server) = self.select_server(&config) else {
            callback(ResolveResult::failure(ResolveStatus::ServerFail, hostname));
            return;
        };
        let Ok(server_addr) = server.socket_addr() else {
            callback(ResolveResult::failure(ResolveStatus::ServerFail, hostname));
            return;
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let ctx = QueryContext::new(id, hostname.to_string(), callback);
        self.contexts.lock().unwrap().insert(id, ctx.clone());

        let transport = self.transport_for(server_addr);
        let server_key = server.key();
        let timeout = Duration::from_millis(server.timeout_ms as u64);
        let ipv6_enabled = config.ipv6_enabled;
        let weak = self.self_ref.clone();
        let task_ctx = ctx.clone();
        let task_hostname = ctx.hostname.clone();

        let task = self.runtime.spawn(async move {
            let outcome =
                Self::run_query(transport, task_hostname, ipv6_enabled, timeout).await;
            match weak.upgrade() {
                Some(strategy) => strategy.handle_result(&task_ctx, &server_key, outcome),
                None => task_ctx.complete(ResolveResult::failure(
                    ResolveStatus::Cancelled,
                    task_ctx.hostname.clone(),
                )),
            }
        });
        ctx.attach_task(task);
    }

    fn process_events(&self) {
        if !self.is_initialized() {
            return;
        }
        let mut contexts = self.contexts.lock().unwrap();
        contexts.retain(|_, ctx| !ctx.is_completed());
    }

    fn shutdown(&self) {
        if self
            .initialized
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("strategy shutdown already in progress");
            return;
        }

        let drained: Vec<Arc<QueryContext>> =
            self.contexts.lock().unwrap().drain().map(|(_, c)| c).collect();
        for ctx in drained {
            ctx.abort_task();
            let mut result =
                ResolveResult::failure(ResolveStatus::Cancelled, ctx.hostname.clone());
            result.elapsed_ms = ctx.started_at.elapsed().as_millis() as u64;
            ctx.complete(result);
        }

        self.transports.lock().unwrap().clear();
        info!("multiplex strategy shut down");
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    fn update_config(&self, config: Arc<ResolverConfig>) {
        self.health.ensure_servers(&config.servers);
        self.config.store(config);
        debug!("strategy configuration updated");
    }
}

impl Drop for MultiplexStrategy {
    fn drop(&mut self) {
        if self.is_initialized() {
            warn!("strategy dropped without shutdown, cancelling outstanding queries");
            self.shutdown();
        }
    }
}

fn status_for_error(error: &ResolverError) -> ResolveStatus {
    match error {
        ResolverError::TransportTimeout { .. } => ResolveStatus::Timeout,
        ResolverError::TransportConnectionRefused { .. }
        | ResolverError::TransportConnectionReset { .. }
        | ResolverError::Io(_) => ResolveStatus::TransportError,
        ResolverError::MessageDecode(_) => ResolveStatus::ServerFail,
        ResolverError::InvalidHostname(_) | ResolverError::MessageEncode(_) => {
            ResolveStatus::BadName
        }
        _ => ResolveStatus::TransportError,
    }
}
