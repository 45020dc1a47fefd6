// src/notify/queued.rs
use anyhow::{anyhow, Result};
use metrics::counter;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use super::NotificationSink;
use crate::config::MAX_QUEUE_CAPACITY;
use crate::event::Event;

/// Async delivery of one event to the remote collector.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn deliver(&self, event: &Event) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Non-blocking sink: `send` enqueues, a single worker task delivers in order.
#[derive(Debug, Clone)]
pub struct QueuedSink {
    tx: mpsc::Sender<Event>,
}

/// Handle to the delivery worker. `finish` waits until every queued event was
/// attempted; it only returns once all `QueuedSink` clones are dropped.
pub struct DeliveryWorker {
    handle: JoinHandle<()>,
}

impl QueuedSink {
    /// Spawn the delivery worker on the current tokio runtime.
    /// `capacity` is clamped to `1..=MAX_QUEUE_CAPACITY`.
    pub fn spawn<T: Transport>(transport: T, capacity: usize) -> (Self, DeliveryWorker) {
        let (tx, mut rx) = mpsc::channel::<Event>(capacity.clamp(1, MAX_QUEUE_CAPACITY));
        let handle = tokio::spawn(async move {
            while let Some(ev) = rx.recv().await {
                if let Err(e) = transport.deliver(&ev).await {
                    counter!("alerts_delivery_failures_total").increment(1);
                    tracing::warn!(
                        transport = transport.name(),
                        title = %ev.title,
                        "delivery failed: {e:#}"
                    );
                }
            }
            tracing::debug!(transport = transport.name(), "delivery queue closed");
        });
        (Self { tx }, DeliveryWorker { handle })
    }
}

impl NotificationSink for QueuedSink {
    fn send(&self, event: Event) -> Result<()> {
        match self.tx.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(ev)) => Err(anyhow!(
                "delivery queue full, dropping alert {:?}",
                ev.title
            )),
            Err(TrySendError::Closed(_)) => Err(anyhow!("delivery worker stopped")),
        }
    }
}

impl DeliveryWorker {
    pub async fn finish(self) {
        if let Err(e) = self.handle.await {
            tracing::error!("delivery worker crashed: {e}");
        }
    }
}
