use serde::{Deserialize, Serialize};
use std::net::{AddrParseError, SocketAddr};

/// One upstream DNS server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    /// IP address of the server (e.g. "8.8.8.8")
    pub address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Selection weight; higher wins against equally fast servers.
    #[serde(default = "default_weight")]
    pub weight: u32,

    /// Per-attempt transport timeout for this server.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u32,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ServerConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port: default_port(),
            weight: default_weight(),
            timeout_ms: default_timeout_ms(),
            enabled: true,
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        Ok(SocketAddr::new(self.address.parse()?, self.port))
    }

    /// Stable identity used for health tracking and metrics labels.
    pub fn key(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

fn default_port() -> u16 {
    53
}

fn default_weight() -> u32 {
    1
}

fn default_timeout_ms() -> u32 {
    2000
}

fn default_true() -> bool {
    true
}
