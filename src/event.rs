// src/event.rs
use serde::Serialize;

use crate::urgency::UrgencyLevel;

/// One synthesized alert. Built per tick and moved into the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub title: String,
    pub body: String,
    pub urgency: UrgencyLevel,
}

impl Event {
    pub fn new(title: impl Into<String>, body: impl Into<String>, urgency: UrgencyLevel) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            urgency,
        }
    }
}
