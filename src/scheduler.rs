// src/scheduler.rs
//! Periodic task runner. One tokio task per schedule; ticks never overlap.
//!
//! - `FixedRate`: ticks land on `start + initial_delay + n * period`. A tick that
//!   overruns is followed by catch-up ticks (`MissedTickBehavior::Burst`).
//! - `FixedDelay`: the next tick starts `period` after the previous one finished.
//!
//! A tick returning `Err` or panicking is logged and counted; the schedule keeps going.

use anyhow::{anyhow, Result};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulePolicy {
    #[default]
    FixedRate,
    FixedDelay,
}

impl FromStr for SchedulePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "fixed-rate" | "rate" => Ok(SchedulePolicy::FixedRate),
            "fixed-delay" | "delay" => Ok(SchedulePolicy::FixedDelay),
            _ => Err("expected `fixed-rate` or `fixed-delay`".into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleCfg {
    pub initial_delay: Duration,
    pub period: Duration,
    pub policy: SchedulePolicy,
}

impl ScheduleCfg {
    pub fn fixed_rate(initial_delay: Duration, period: Duration) -> Self {
        Self {
            initial_delay,
            period,
            policy: SchedulePolicy::FixedRate,
        }
    }

    pub fn fixed_delay(initial_delay: Duration, period: Duration) -> Self {
        Self {
            initial_delay,
            period,
            policy: SchedulePolicy::FixedDelay,
        }
    }
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("alerts_ticks_total", "Scheduler ticks run.");
        describe_counter!(
            "alerts_tick_failures_total",
            "Ticks that returned an error."
        );
        describe_counter!("alerts_tick_panics_total", "Ticks that panicked.");
        describe_gauge!("alerts_last_tick_ts", "Unix ts of the last tick.");
    });
}

pub struct Scheduler {
    cfg: ScheduleCfg,
}

impl Scheduler {
    /// Zero period is a configuration error.
    pub fn new(cfg: ScheduleCfg) -> Result<Self> {
        if cfg.period.is_zero() {
            return Err(anyhow!("schedule period must be positive"));
        }
        Ok(Self { cfg })
    }

    pub fn cfg(&self) -> ScheduleCfg {
        self.cfg
    }

    /// Spawn `task` on the current tokio runtime. The first tick fires after
    /// `initial_delay`, measured from this call.
    pub fn schedule<F>(&self, name: &'static str, task: F) -> SchedulerHandle
    where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        ensure_metrics_described();

        let (stop_tx, stop_rx) = watch::channel(false);
        let ticks = Arc::new(AtomicU64::new(0));
        let runner = TickRunner {
            name,
            task,
            ticks: ticks.clone(),
        };
        let cfg = self.cfg;
        let start = Instant::now() + cfg.initial_delay;

        tracing::info!(
            task = name,
            initial_delay_ms = cfg.initial_delay.as_millis() as u64,
            period_ms = cfg.period.as_millis() as u64,
            policy = ?cfg.policy,
            "scheduling task"
        );

        let join = match cfg.policy {
            SchedulePolicy::FixedRate => tokio::spawn(run_fixed_rate(runner, start, cfg.period, stop_rx)),
            SchedulePolicy::FixedDelay => tokio::spawn(run_fixed_delay(runner, start, cfg.period, stop_rx)),
        };

        SchedulerHandle {
            name,
            stop_tx,
            join,
            ticks,
        }
    }
}

struct TickRunner<F> {
    name: &'static str,
    task: F,
    ticks: Arc<AtomicU64>,
}

impl<F> TickRunner<F>
where
    F: FnMut() -> Result<()>,
{
    fn run_once(&mut self) {
        let n = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        counter!("alerts_ticks_total").increment(1);
        gauge!("alerts_last_tick_ts").set(chrono::Utc::now().timestamp() as f64);

        match panic::catch_unwind(AssertUnwindSafe(|| (self.task)())) {
            Ok(Ok(())) => tracing::trace!(task = self.name, tick = n, "tick ok"),
            Ok(Err(e)) => {
                counter!("alerts_tick_failures_total").increment(1);
                tracing::warn!(task = self.name, tick = n, "tick failed: {e:#}");
            }
            Err(payload) => {
                counter!("alerts_tick_panics_total").increment(1);
                tracing::error!(
                    task = self.name,
                    tick = n,
                    panic = panic_message(payload.as_ref()),
                    "tick panicked"
                );
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

async fn run_fixed_rate<F>(
    mut runner: TickRunner<F>,
    start: Instant,
    period: Duration,
    mut stop: watch::Receiver<bool>,
) where
    F: FnMut() -> Result<()>,
{
    let mut ticker = time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
    loop {
        tokio::select! {
            biased;
            _ = stop.changed() => break,
            _ = ticker.tick() => runner.run_once(),
        }
    }
    tracing::info!(task = runner.name, "scheduler stopped");
}

async fn run_fixed_delay<F>(
    mut runner: TickRunner<F>,
    start: Instant,
    period: Duration,
    mut stop: watch::Receiver<bool>,
) where
    F: FnMut() -> Result<()>,
{
    let mut next = start;
    loop {
        tokio::select! {
            biased;
            _ = stop.changed() => break,
            _ = time::sleep_until(next) => {
                runner.run_once();
                next = Instant::now() + period;
            }
        }
    }
    tracing::info!(task = runner.name, "scheduler stopped");
}

/// Owns a running schedule. Dropping the handle stops the task too.
pub struct SchedulerHandle {
    name: &'static str,
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
    ticks: Arc<AtomicU64>,
}

impl SchedulerHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ticks run so far (including failed ones).
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Stop after the current tick; no further ticks fire.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.join.await {
            tracing::error!(task = self.name, "scheduler task ended abnormally: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_parses() {
        assert_eq!("fixed-rate".parse::<SchedulePolicy>().unwrap(), SchedulePolicy::FixedRate);
        assert_eq!("FIXED_DELAY".parse::<SchedulePolicy>().unwrap(), SchedulePolicy::FixedDelay);
        assert!("cron".parse::<SchedulePolicy>().is_err());
    }

    #[test]
    fn zero_period_rejected() {
        assert!(Scheduler::new(ScheduleCfg::fixed_rate(Duration::ZERO, Duration::ZERO)).is_err());
    }

    #[test]
    fn panic_message_extracts_strings() {
        let p: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(p.as_ref()), "boom");
        let p: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(p.as_ref()), "bang");
    }

    #[tokio::test(start_paused = true)]
    async fn zero_delay_fires_immediately() {
        let sched = Scheduler::new(ScheduleCfg::fixed_rate(Duration::ZERO, Duration::from_millis(50))).unwrap();
        let handle = sched.schedule("test", || Ok(()));
        time::sleep(Duration::from_millis(120)).await;
        let seen = handle.ticks();
        assert_eq!(seen, 3); // t = 0, 50, 100
        handle.stop().await;
    }
}
