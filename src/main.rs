//! Alert simulator — Binary Entrypoint
//! Holds the liveness port open and pushes a random demo alert every period
//! until interrupted.

use alert_simulator::config::{AppConfig, LogFormat};
use alert_simulator::{metrics, notify, Simulator};
use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("alert_simulator=info,alerts=info,warn"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Compact => registry.with(fmt::layer().compact()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let cfg = AppConfig::from_env().context("loading configuration")?;
    init_tracing(cfg.log_format);

    if let Some(addr) = cfg.metrics_addr {
        metrics::install_exporter(addr)?;
    }

    let (sink, worker) = notify::build_sink(&cfg)?;
    let running = Simulator::new(cfg, sink)?.start().await?;
    tracing::info!(addr = %running.listen_addr(), "alert simulator running");

    tokio::signal::ctrl_c()
        .await
        .context("waiting for ctrl-c")?;
    tracing::info!("interrupt received, shutting down");

    running.shutdown().await;
    // The simulator owned the last sink reference, so the queue can drain now.
    if let Some(worker) = worker {
        worker.finish().await;
    }
    Ok(())
}
