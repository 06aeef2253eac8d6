//! Vigil DNS Application Layer
//!
//! Ports (traits) through which the resolution pipeline consumes its
//! collaborators. Implementations live in the infrastructure layer and are
//! wired up at construction time.
pub mod ports;

pub use ports::{
    ConfigChangeHandler, ConfigProvider, HostCache, MetricsSink, QueryCallback, QueryStrategy,
};
