use serde::{Deserialize, Serialize};

/// Exponential backoff bounds: attempt n is retried after
/// `min(base_delay_ms * 2^(n-1), max_delay_ms)`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Total attempt ceiling, counting the initial dispatch.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u32,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u32 {
    100
}

fn default_max_delay_ms() -> u32 {
    1000
}
