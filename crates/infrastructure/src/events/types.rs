use std::net::IpAddr;
use std::time::SystemTime;
use vigil_dns_domain::RecordKind;

/// Origin tag carried by every address-change event.
pub const EVENT_SOURCE: &str = "dns_resolver";

/// Emitted when a successful resolution produced an address list that
/// differs from what the cache previously held for the hostname.
///
/// Comparison is order-sensitive: the event carries both lists so
/// subscribers can diff them however they need.
#[derive(Debug, Clone)]
pub struct AddressChangeEvent {
    pub hostname: String,

    /// What the cache held before this resolution; empty on first sighting.
    pub old_addresses: Vec<IpAddr>,

    pub new_addresses: Vec<IpAddr>,

    pub timestamp: SystemTime,

    pub source: &'static str,

    /// Cache TTL in effect when the change was observed.
    pub ttl_ms: u64,

    /// AAAA as soon as any new address is IPv6, A otherwise.
    pub record_kind: RecordKind,

    /// Always false: answers come from recursive upstreams.
    pub is_authoritative: bool,
}

impl AddressChangeEvent {
    pub fn new(
        hostname: impl Into<String>,
        old_addresses: Vec<IpAddr>,
        new_addresses: Vec<IpAddr>,
        ttl_ms: u64,
    ) -> Self {
        let record_kind = RecordKind::of(&new_addresses);
        Self {
            hostname: hostname.into(),
            old_addresses,
            new_addresses,
            timestamp: SystemTime::now(),
            source: EVENT_SOURCE,
            ttl_ms,
            record_kind,
            is_authoritative: false,
        }
    }
}
