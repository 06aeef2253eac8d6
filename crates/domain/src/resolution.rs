use serde::Serialize;
use std::fmt;
use std::net::IpAddr;

/// Terminal status of a resolution attempt.
///
/// Every callback receives exactly one of these. The retryable subset
/// (timeouts, upstream failures, transport faults) drives the resolver's
/// backoff loop; negative answers (`NoData`, `NotFound`) are authoritative
/// and never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResolveStatus {
    Success,
    NotInitialized,
    BadName,
    Overloaded,
    Timeout,
    ServerFail,
    NoData,
    NotFound,
    Cancelled,
    TransportError,
}

impl ResolveStatus {
    /// Whether the resolver should schedule another attempt for this status.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::ServerFail | Self::TransportError
        )
    }

    /// Whether a failure with this status counts against the upstream
    /// server's health. Negative answers mean the server did its job.
    pub fn is_server_attributable(self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::ServerFail | Self::TransportError
        )
    }
}

impl fmt::Display for ResolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::Success => "successful completion",
            Self::NotInitialized => "resolver not initialized",
            Self::BadName => "misformatted hostname",
            Self::Overloaded => "too many queries in flight",
            Self::Timeout => "query timed out",
            Self::ServerFail => "upstream server failure",
            Self::NoData => "no address records for requested family",
            Self::NotFound => "hostname not found",
            Self::Cancelled => "query cancelled",
            Self::TransportError => "network transport error",
        };
        f.write_str(message)
    }
}

/// DNS record family of an address set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordKind {
    A,
    Aaaa,
}

impl RecordKind {
    /// Classify an address list: AAAA as soon as any address is IPv6.
    pub fn of(addresses: &[IpAddr]) -> Self {
        if addresses.iter().any(IpAddr::is_ipv6) {
            Self::Aaaa
        } else {
            Self::A
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::Aaaa => f.write_str("AAAA"),
        }
    }
}

/// Outcome delivered to a resolution callback.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveResult {
    pub status: ResolveStatus,
    pub hostname: String,
    pub addresses: Vec<IpAddr>,
    /// Wall-clock milliseconds from admission to delivery, spanning retries.
    pub elapsed_ms: u64,
    pub error: Option<String>,
    pub from_cache: bool,
}

impl ResolveResult {
    pub fn success(hostname: impl Into<String>, addresses: Vec<IpAddr>, elapsed_ms: u64) -> Self {
        Self {
            status: ResolveStatus::Success,
            hostname: hostname.into(),
            addresses,
            elapsed_ms,
            error: None,
            from_cache: false,
        }
    }

    pub fn failure(status: ResolveStatus, hostname: impl Into<String>) -> Self {
        Self {
            status,
            hostname: hostname.into(),
            addresses: Vec::new(),
            elapsed_ms: 0,
            error: Some(status.to_string()),
            from_cache: false,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResolveStatus::Success
    }
}
