use crate::config::ConfigError;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("invalid hostname: {0}")]
    InvalidHostname(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("no factory registered under name: {0}")]
    FactoryNotFound(String),

    #[error("no usable upstream servers configured")]
    NoUsableServers,

    #[error("async runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("failed to encode DNS message: {0}")]
    MessageEncode(String),

    #[error("failed to decode DNS response: {0}")]
    MessageDecode(String),

    #[error("timed out waiting for {server}")]
    TransportTimeout { server: SocketAddr },

    #[error("connection refused by {server}")]
    TransportConnectionRefused { server: SocketAddr },

    #[error("connection reset by {server}")]
    TransportConnectionReset { server: SocketAddr },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("resolver not initialized")]
    NotInitialized,
}

impl ResolverError {
    /// Network-level faults that say nothing about the queried name.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::TransportTimeout { .. }
                | Self::TransportConnectionRefused { .. }
                | Self::TransportConnectionReset { .. }
                | Self::Io(_)
        )
    }
}
