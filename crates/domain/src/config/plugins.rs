use serde::{Deserialize, Serialize};

/// Reserved record for an external dynamic-library loading facility.
/// The core keeps this configuration alongside the factory registry but
/// never performs dynamic loading itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PluginsConfig {
    #[serde(default)]
    pub auto_load: bool,

    #[serde(default)]
    pub config_path: String,

    #[serde(default)]
    pub allowed_plugins: Vec<String>,

    #[serde(default = "default_reload_interval_ms")]
    pub reload_interval_ms: u64,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            auto_load: false,
            config_path: String::new(),
            allowed_plugins: Vec::new(),
            reload_interval_ms: default_reload_interval_ms(),
        }
    }
}

fn default_reload_interval_ms() -> u64 {
    60_000
}
