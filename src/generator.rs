// src/generator.rs
use anyhow::Result;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use rand::Rng;
use std::sync::Arc;

use crate::config::PoolsConfig;
use crate::event::Event;
use crate::notify::NotificationSink;
use crate::pool::{alphabetic_string_with, PoolError, SamplePool};
use crate::urgency::UrgencyLevel;

/// Where alert bodies come from.
#[derive(Debug, Clone)]
pub enum BodySource {
    /// Sample a fully-formed message.
    Pool(SamplePool<String>),
    /// Random `[A-Za-z]` text of exactly `len` characters.
    RandomAlphabetic { len: usize },
}

impl BodySource {
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match self {
            BodySource::Pool(pool) => pool.select_with(rng).clone(),
            BodySource::RandomAlphabetic { len } => alphabetic_string_with(rng, *len),
        }
    }
}

/// The read-only pools the generator draws from.
#[derive(Debug, Clone)]
pub struct Pools {
    pub titles: SamplePool<String>,
    pub body: BodySource,
    pub urgencies: SamplePool<UrgencyLevel>,
}

impl Pools {
    /// Any empty pool is a configuration error.
    pub fn from_config(cfg: &PoolsConfig) -> Result<Self, PoolError> {
        let body = match &cfg.messages {
            Some(msgs) => BodySource::Pool(SamplePool::new("messages", msgs.clone())?),
            None => BodySource::RandomAlphabetic { len: cfg.body_len },
        };
        Ok(Self {
            titles: SamplePool::new("titles", cfg.titles.clone())?,
            body,
            urgencies: SamplePool::new("urgencies", cfg.urgencies.clone())?,
        })
    }
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "alerts_events_dispatched_total",
            "Events handed to the notification sink."
        );
        describe_counter!(
            "alerts_dispatch_errors_total",
            "Events the sink refused synchronously."
        );
    });
}

/// Synthesizes one random event per call and hands it to the sink.
#[derive(Clone)]
pub struct EventGenerator {
    pools: Arc<Pools>,
    sink: Arc<dyn NotificationSink>,
}

impl EventGenerator {
    pub fn new(pools: Arc<Pools>, sink: Arc<dyn NotificationSink>) -> Self {
        ensure_metrics_described();
        Self { pools, sink }
    }

    pub fn pools(&self) -> &Pools {
        &self.pools
    }

    pub fn synthesize(&self) -> Event {
        self.synthesize_with(&mut rand::rng())
    }

    pub fn synthesize_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Event {
        let title = self.pools.titles.select_with(rng).clone();
        let body = self.pools.body.draw(rng);
        let urgency = *self.pools.urgencies.select_with(rng);
        Event {
            title,
            body,
            urgency,
        }
    }

    /// One tick: build an event and dispatch it. Does not wait for delivery.
    /// A synchronous sink error is returned to the caller.
    pub fn generate_and_dispatch(&self) -> Result<()> {
        let ev = self.synthesize();
        tracing::info!(title = %ev.title, urgency = %ev.urgency, "Sending Message");
        if let Err(e) = self.sink.send(ev) {
            counter!("alerts_dispatch_errors_total").increment(1);
            return Err(e);
        }
        counter!("alerts_events_dispatched_total").increment(1);
        Ok(())
    }
}
