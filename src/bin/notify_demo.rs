//! Demo that synthesizes a few alerts from the configured pools and pushes
//! them through the configured sink (log-only when no endpoint is set).

use std::sync::Arc;

use alert_simulator::config::AppConfig;
use alert_simulator::{notify, EventGenerator, Pools};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let cfg = AppConfig::from_env()?;
    let pools = Pools::from_config(&cfg.pools)?;
    let (sink, worker) = notify::build_sink(&cfg)?;
    let generator = EventGenerator::new(Arc::new(pools), sink);

    for _ in 0..4 {
        if let Err(e) = generator.generate_and_dispatch() {
            tracing::warn!("dispatch failed: {e:#}");
        }
        tokio::time::sleep(std::time::Duration::from_millis(400)).await;
    }

    drop(generator);
    if let Some(worker) = worker {
        worker.finish().await;
    }
    println!("notify-demo done");
    Ok(())
}
