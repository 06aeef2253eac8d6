use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vigil_dns_application::{QueryCallback, QueryStrategy};
use vigil_dns_domain::{ResolveResult, ResolveStatus, ResolverConfig};

/// What the stub does with the next dispatched query.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Complete synchronously with the given addresses.
    Succeed(Vec<IpAddr>),
    /// Complete synchronously with the given failure status.
    Fail(ResolveStatus),
    /// Complete with the given addresses after a delay, from a spawned
    /// task. Lets tests overlap several in-flight resolutions.
    Delay(u64, Vec<IpAddr>),
    /// Hold the callback without firing it, keeping the query in flight
    /// until shutdown cancels it.
    Hang,
}

/// Deterministic stand-in for the multiplex strategy. Each `query` pops
/// the next scripted outcome; when the script runs dry the last outcome
/// repeats.
pub struct ScriptedStrategy {
    script: Mutex<VecDeque<ScriptedOutcome>>,
    last: Mutex<Option<ScriptedOutcome>>,
    held: Mutex<Vec<(String, QueryCallback)>>,
    dispatches: AtomicUsize,
    initialized: AtomicBool,
}

impl ScriptedStrategy {
    pub fn new(script: Vec<ScriptedOutcome>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            held: Mutex::new(Vec::new()),
            dispatches: AtomicUsize::new(0),
            initialized: AtomicBool::new(true),
        })
    }

    pub fn dispatches(&self) -> usize {
        self.dispatches.load(Ordering::SeqCst)
    }

    fn next_outcome(&self) -> ScriptedOutcome {
        let mut script = self.script.lock().unwrap();
        let mut last = self.last.lock().unwrap();
        if let Some(outcome) = script.pop_front() {
            *last = Some(outcome.clone());
            outcome
        } else {
            last.clone().expect("scripted strategy queried with an empty script")
        }
    }
}

impl QueryStrategy for ScriptedStrategy {
    fn query(&self, hostname: &str, callback: QueryCallback) {
        self.dispatches.fetch_add(1, Ordering::SeqCst);

        match self.next_outcome() {
            ScriptedOutcome::Succeed(addresses) => {
                callback(ResolveResult::success(hostname, addresses, 1));
            }
            ScriptedOutcome::Fail(status) => {
                callback(ResolveResult::failure(status, hostname));
            }
            ScriptedOutcome::Delay(delay_ms, addresses) => {
                let hostname = hostname.to_string();
                tokio::spawn(async move {
                    tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
                    callback(ResolveResult::success(hostname, addresses, delay_ms));
                });
            }
            ScriptedOutcome::Hang => {
                self.held.lock().unwrap().push((hostname.to_string(), callback));
            }
        }
    }

    fn process_events(&self) {}

    fn shutdown(&self) {
        self.initialized.store(false, Ordering::SeqCst);
        let held: Vec<_> = self.held.lock().unwrap().drain(..).collect();
        for (hostname, callback) in held {
            callback(ResolveResult::failure(ResolveStatus::Cancelled, hostname));
        }
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn update_config(&self, _config: Arc<ResolverConfig>) {}
}
