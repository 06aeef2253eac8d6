//! # Vigil DNS
//!
//! Command-line driver for the embedded resolution service: resolves the
//! given hostnames, reports address changes, and prints a metrics summary.

mod bootstrap;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use vigil_dns_infrastructure::{BasicMetrics, DnsResolver, EventBus};

#[derive(Parser)]
#[command(name = "vigil-dns")]
#[command(version = "0.1.0")]
#[command(about = "Asynchronous DNS resolution service with change detection")]
struct Cli {
    /// Hostnames to resolve
    #[arg(required = true)]
    hostnames: Vec<String>,

    /// Path to a JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Watch the config file for changes while running
    #[arg(long)]
    watch: bool,

    /// Print the metrics summary after resolving
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    bootstrap::logging::init_logging(&cli.log_level);

    let config_manager = bootstrap::config::load_config(cli.config.as_deref())?;
    if cli.watch {
        if let Some(path) = &cli.config {
            config_manager.enable_hot_reload(path, Duration::from_secs(5))?;
        }
    }

    let metrics = Arc::new(BasicMetrics::new());
    let events = Arc::new(EventBus::new());
    events.subscribe_address_change(Box::new(|event| {
        tracing::info!(
            hostname = %event.hostname,
            old = ?event.old_addresses,
            new = ?event.new_addresses,
            record_type = %event.record_kind,
            "address set changed"
        );
    }));

    let metrics_sink: Arc<dyn vigil_dns_application::MetricsSink> = metrics.clone();
    let resolver = DnsResolver::new(config_manager.clone(), Some(metrics_sink), events);
    anyhow::ensure!(resolver.initialize(), "resolver failed to initialize");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let expected = cli.hostnames.len();
    for hostname in &cli.hostnames {
        let tx = tx.clone();
        resolver.resolve(hostname, move |result| {
            let _ = tx.send(result);
        });
    }
    drop(tx);

    // Driver loop: reap completed query contexts while collecting results.
    let mut received = 0usize;
    let mut ticker = tokio::time::interval(Duration::from_millis(10));
    while received < expected {
        tokio::select! {
            maybe_result = rx.recv() => {
                let Some(result) = maybe_result else { break };
                received += 1;
                if result.is_success() {
                    let addresses: Vec<String> =
                        result.addresses.iter().map(|a| a.to_string()).collect();
                    println!(
                        "{}: {} ({} ms{})",
                        result.hostname,
                        addresses.join(", "),
                        result.elapsed_ms,
                        if result.from_cache { ", cached" } else { "" },
                    );
                } else {
                    println!(
                        "{}: FAILED ({})",
                        result.hostname,
                        result.error.as_deref().unwrap_or("unknown error"),
                    );
                }
            }
            _ = ticker.tick() => resolver.process_events(),
        }
    }

    if cli.stats {
        println!("{}", metrics.prometheus_render());
    }

    resolver.shutdown();
    Ok(())
}
