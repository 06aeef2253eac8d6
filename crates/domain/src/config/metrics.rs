use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub metrics_file: String,

    #[serde(default = "default_report_interval_sec")]
    pub report_interval_sec: u32,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            metrics_file: String::new(),
            report_interval_sec: default_report_interval_sec(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_report_interval_sec() -> u32 {
    60
}
