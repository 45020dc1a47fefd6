// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod config;
pub mod event;
pub mod generator;
pub mod listener;
pub mod metrics;
pub mod pool;
pub mod scheduler;
pub mod simulator;
pub mod urgency;

// Outbound notification sinks & delivery worker
pub mod notify;

// ---- Re-exports for stable public API ----
pub use crate::config::AppConfig;
pub use crate::event::Event;
pub use crate::generator::{BodySource, EventGenerator, Pools};
pub use crate::notify::{MemorySink, NotificationSink};
pub use crate::pool::{PoolError, SamplePool};
pub use crate::scheduler::{SchedulePolicy, ScheduleCfg, Scheduler, SchedulerHandle};
pub use crate::simulator::{RunningSimulator, Simulator};
pub use crate::urgency::UrgencyLevel;
