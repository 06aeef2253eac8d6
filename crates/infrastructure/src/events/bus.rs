use super::types::AddressChangeEvent;
use std::net::IpAddr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Mutex;
use tracing::debug;

pub type AddressChangeHandler = Box<dyn Fn(&AddressChangeEvent) + Send + Sync>;
pub type QueryStartHandler = Box<dyn Fn(&str) + Send + Sync>;
pub type QueryCompleteHandler = Box<dyn Fn(&str, &[IpAddr], bool) + Send + Sync>;

/// Synchronous fan-out of resolution events.
///
/// Subscribers run in registration order on the publishing thread. A panic
/// in one subscriber is caught and ignored so the remaining subscribers
/// still receive the event. Subscribers must not block: the per-kind lock
/// is held across the whole fan-out.
#[derive(Default)]
pub struct EventBus {
    address_change: Mutex<Vec<AddressChangeHandler>>,
    query_start: Mutex<Vec<QueryStartHandler>>,
    query_complete: Mutex<Vec<QueryCompleteHandler>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish_address_changed(&self, event: &AddressChangeEvent) {
        let handlers = self.address_change.lock().unwrap();
        for handler in handlers.iter() {
            if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                debug!(hostname = %event.hostname, "address-change subscriber panicked");
            }
        }
    }

    pub fn publish_query_started(&self, hostname: &str) {
        let handlers = self.query_start.lock().unwrap();
        for handler in handlers.iter() {
            if catch_unwind(AssertUnwindSafe(|| handler(hostname))).is_err() {
                debug!(hostname = %hostname, "query-start subscriber panicked");
            }
        }
    }

    pub fn publish_query_completed(&self, hostname: &str, addresses: &[IpAddr], success: bool) {
        let handlers = self.query_complete.lock().unwrap();
        for handler in handlers.iter() {
            if catch_unwind(AssertUnwindSafe(|| handler(hostname, addresses, success))).is_err() {
                debug!(hostname = %hostname, "query-complete subscriber panicked");
            }
        }
    }

    pub fn subscribe_address_change(&self, handler: AddressChangeHandler) {
        self.address_change.lock().unwrap().push(handler);
    }

    pub fn subscribe_query_start(&self, handler: QueryStartHandler) {
        self.query_start.lock().unwrap().push(handler);
    }

    pub fn subscribe_query_complete(&self, handler: QueryCompleteHandler) {
        self.query_complete.lock().unwrap().push(handler);
    }

    pub fn unsubscribe_all(&self) {
        self.address_change.lock().unwrap().clear();
        self.query_start.lock().unwrap().clear();
        self.query_complete.lock().unwrap().clear();
    }
}
