// src/notify/mod.rs
//! Notification sinks: the capability the generator dispatches events through.

pub mod http;
pub mod memory;
pub mod queued;

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::{AppConfig, SinkKind};
use crate::event::Event;

pub use http::HttpTransport;
pub use memory::MemorySink;
pub use queued::{DeliveryWorker, QueuedSink, Transport};

/// Fire-and-forget sink. `send` must not wait for remote delivery; an `Err`
/// means the event could not even be handed off.
pub trait NotificationSink: Send + Sync {
    fn send(&self, event: Event) -> Result<()>;
}

/// Writes events to the log only. Used when no remote endpoint is configured.
#[derive(Debug, Clone, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn send(&self, event: Event) -> Result<()> {
        tracing::info!(
            target: "alerts",
            title = %event.title,
            urgency = %event.urgency,
            body_len = event.body.len(),
            "alert (log sink)"
        );
        Ok(())
    }
}

/// Build the sink selected by configuration. Must run inside a tokio runtime
/// because the HTTP sink spawns its delivery worker.
pub fn build_sink(cfg: &AppConfig) -> Result<(Arc<dyn NotificationSink>, Option<DeliveryWorker>)> {
    match cfg.sink {
        SinkKind::Log => {
            tracing::info!("notification endpoint not configured, using log sink");
            Ok((Arc::new(LogSink), None))
        }
        SinkKind::Http => {
            let endpoint = cfg
                .endpoint
                .as_ref()
                .context("http sink selected but ALERTS_ENDPOINT_HOST is not set")?;
            let transport = HttpTransport::new(endpoint, cfg.app_token.clone())?;
            tracing::info!(endpoint = %transport.url(), "using http sink");
            let (sink, worker) = QueuedSink::spawn(transport, cfg.queue_capacity);
            Ok((Arc::new(sink), Some(worker)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::urgency::UrgencyLevel;

    #[test]
    fn log_sink_accepts_everything() {
        let sink = LogSink;
        assert!(sink
            .send(Event::new("Disk Full", "abc", UrgencyLevel::High))
            .is_ok());
    }

    #[test]
    fn shared_sink_records_through_trait_object() {
        let inner = Arc::new(MemorySink::new());
        let shared: Arc<dyn NotificationSink> = inner.clone();
        shared.send(Event::new("A", "b", UrgencyLevel::Low)).unwrap();
        assert_eq!(inner.len(), 1);
    }
}
