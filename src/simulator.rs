// src/simulator.rs
//! Startup wiring: pools → liveness port → scheduled generator.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::generator::{EventGenerator, Pools};
use crate::listener::BootstrapListener;
use crate::notify::NotificationSink;
use crate::scheduler::{Scheduler, SchedulerHandle};

pub struct Simulator {
    cfg: AppConfig,
    generator: EventGenerator,
    scheduler: Scheduler,
}

impl Simulator {
    /// Validates pools and schedule. Nothing is bound or spawned yet.
    pub fn new(cfg: AppConfig, sink: Arc<dyn NotificationSink>) -> Result<Self> {
        let pools = Pools::from_config(&cfg.pools).context("building sample pools")?;
        let scheduler = Scheduler::new(cfg.schedule).context("building scheduler")?;
        tracing::info!(
            titles = pools.titles.len(),
            urgencies = pools.urgencies.len(),
            "sample pools ready"
        );
        Ok(Self {
            generator: EventGenerator::new(Arc::new(pools), sink),
            scheduler,
            cfg,
        })
    }

    pub fn generator(&self) -> &EventGenerator {
        &self.generator
    }

    /// Bind the liveness port, then start ticking. A bind failure aborts
    /// before the scheduler is started.
    pub async fn start(self) -> Result<RunningSimulator> {
        let listener = BootstrapListener::bind(&self.cfg.listen_host, self.cfg.listen_port).await?;

        let generator = self.generator;
        let schedule = self
            .scheduler
            .schedule("generate_and_dispatch", move || generator.generate_and_dispatch());

        Ok(RunningSimulator { listener, schedule })
    }
}

pub struct RunningSimulator {
    listener: BootstrapListener,
    schedule: SchedulerHandle,
}

impl RunningSimulator {
    pub fn listen_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    pub fn listener(&self) -> &BootstrapListener {
        &self.listener
    }

    pub fn ticks(&self) -> u64 {
        self.schedule.ticks()
    }

    /// Stop ticking and close the port. In-flight deliveries are not awaited here.
    pub async fn shutdown(self) {
        self.schedule.stop().await;
        self.listener.shutdown().await;
        tracing::info!("simulator stopped");
    }
}
