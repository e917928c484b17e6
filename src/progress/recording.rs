//! Flow-log recorder

use super::{ProgressHandler, TriageEvent};
use std::sync::{Arc, Mutex, PoisonError};

/// Collects the flow-log line of every event, for display after a batch.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    lines: Mutex<Vec<String>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl ProgressHandler for RecordingHandler {
    fn on_progress(&self, event: &TriageEvent) {
        if let Some(line) = event.flow_line() {
            self.lines
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(line);
        }
    }
}

/// Forwards every event to each inner handler in order.
pub struct FanOutHandler {
    handlers: Vec<Arc<dyn ProgressHandler>>,
}

impl FanOutHandler {
    pub fn new(handlers: Vec<Arc<dyn ProgressHandler>>) -> Self {
        Self { handlers }
    }
}

impl ProgressHandler for FanOutHandler {
    fn on_progress(&self, event: &TriageEvent) {
        for handler in &self.handlers {
            handler.on_progress(event);
        }
    }
}
