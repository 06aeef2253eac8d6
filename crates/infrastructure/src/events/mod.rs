//! Event fan-out for resolution lifecycle notifications.
//!
//! Three event kinds, each with its own subscriber list:
//! query-started, query-completed, and address-changed.

pub mod bus;
pub mod types;

pub use bus::{AddressChangeHandler, EventBus, QueryCompleteHandler, QueryStartHandler};
pub use types::AddressChangeEvent;
