use serde::{Deserialize, Serialize};

/// Cache sizing and lifetime. TTL and capacity are fixed at cache
/// construction; later config updates apply to future caches only.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Entry lifetime in milliseconds.
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,

    #[serde(default = "default_max_size")]
    pub max_size: usize,

    /// Accepted for forward compatibility; persistence is not implemented.
    #[serde(default)]
    pub persistent: bool,

    #[serde(default)]
    pub cache_file: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_ms: default_ttl_ms(),
            max_size: default_max_size(),
            persistent: false,
            cache_file: String::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_ttl_ms() -> u64 {
    300_000
}

fn default_max_size() -> usize {
    10_000
}
