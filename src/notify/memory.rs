// src/notify/memory.rs
use anyhow::{anyhow, Result};
use std::collections::HashSet;
use std::sync::Mutex;

use super::NotificationSink;
use crate::event::Event;

/// In-memory sink for tests and the demo binary.
/// Calls listed in `fail_on` (0-based call index) return an error and are not recorded.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
    calls: Mutex<usize>,
    fail_on: HashSet<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(calls: impl IntoIterator<Item = usize>) -> Self {
        Self {
            fail_on: calls.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().expect("memory sink mutex poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().expect("memory sink mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `send` calls, including failed ones.
    pub fn calls(&self) -> usize {
        *self.calls.lock().expect("memory sink mutex poisoned")
    }
}

impl NotificationSink for MemorySink {
    fn send(&self, event: Event) -> Result<()> {
        let idx = {
            let mut calls = self.calls.lock().expect("memory sink mutex poisoned");
            let idx = *calls;
            *calls += 1;
            idx
        };
        if self.fail_on.contains(&idx) {
            return Err(anyhow!("memory sink: injected failure on call {idx}"));
        }
        self.events
            .lock()
            .expect("memory sink mutex poisoned")
            .push(event);
        Ok(())
    }
}
