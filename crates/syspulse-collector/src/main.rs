//! syspulse collector supervisor.
//!
//! Wires config -> built-in probes -> collector, subscribes a logging
//! consumer so batches are visible on stdout, and runs until ctrl-c or a
//! fatal sampler fault. Rendering front-ends (plots, dashboards) attach
//! through the same subscribe/snapshot APIs this binary uses.

use tracing_subscriber::{fmt, EnvFilter};

use syspulse_core::MetricFilter;
use syspulse_collector::collector::Collector;
use syspulse_collector::{config, probe};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "syspulse.yaml".to_string());

    let cfg = match config::load_from_file(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(path = %config_path, error = %e, "config load failed");
            std::process::exit(2);
        }
    };

    let probes = probe::builtin_probes(&cfg.probes);
    tracing::info!(
        interval_ms = cfg.sampler.interval_ms,
        capacity = cfg.buffer.capacity,
        probes = probes.len(),
        "syspulse-collector starting"
    );

    let collector = match Collector::new(cfg, probes) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "collector setup failed");
            std::process::exit(2);
        }
    };
    let handle = collector.spawn();

    // Demo consumer: one subscription that logs a summary per tick batch.
    let (_sub, mut rx) = handle.subscribe(MetricFilter::All);
    let consumer = tokio::spawn(async move {
        while let Some(batch) = rx.recv().await {
            let summary: Vec<String> = batch
                .samples
                .iter()
                .map(|s| format!("{}={:.1}", s.metric, s.value.as_f64()))
                .collect();
            tracing::info!(
                seq = batch.seq,
                errors = batch.errors.len(),
                "{}",
                summary.join(" ")
            );
        }
    });

    let stopper = handle.stopper();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("ctrl-c received, shutting down");
            stopper.stop();
        }
    });

    let result = handle.join().await;
    let _ = consumer.await;

    match result {
        Ok(()) => tracing::info!("collector stopped cleanly"),
        Err(e) => {
            tracing::error!(error = %e, fatal = e.is_fatal(), "collector terminated");
            std::process::exit(1);
        }
    }
}
