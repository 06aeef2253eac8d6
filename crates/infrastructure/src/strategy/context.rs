use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::task::JoinHandle;
use vigil_dns_application::QueryCallback;
use vigil_dns_domain::ResolveResult;

pub type QueryId = u64;

/// One dispatched query whose callback has not yet fired.
///
/// The callback lives in an `Option` slot so it can fire at most once, no
/// matter how completion and shutdown race. Completed contexts stay in the
/// strategy's in-flight set until the next `process_events` pass reaps
/// them; removal never happens from inside a completion callback.
pub struct QueryContext {
    pub id: QueryId,
    pub hostname: String,
    pub started_at: Instant,
    callback: Mutex<Option<QueryCallback>>,
    completed: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl QueryContext {
    pub fn new(id: QueryId, hostname: String, callback: QueryCallback) -> Arc<Self> {
        Arc::new(Self {
            id,
            hostname,
            started_at: Instant::now(),
            callback: Mutex::new(Some(callback)),
            completed: AtomicBool::new(false),
            task: Mutex::new(None),
        })
    }

    /// Deliver the result through the callback, if it has not fired yet,
    /// and mark the context reapable.
    pub fn complete(&self, result: ResolveResult) {
        let callback = self.callback.lock().unwrap().take();
        if let Some(callback) = callback {
            callback(result);
        }
        self.completed.store(true, Ordering::Release);
    }

    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    pub fn attach_task(&self, handle: JoinHandle<()>) {
        *self.task.lock().unwrap() = Some(handle);
    }

    pub fn abort_task(&self) {
        if let Some(handle) = self.task.lock().unwrap().take() {
            handle.abort();
        }
    }
}
