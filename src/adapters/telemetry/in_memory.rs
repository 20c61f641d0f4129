//! In-memory telemetry sink for testing.
//!
//! Captures delivered events for assertions and can be switched into a
//! failing mode to exercise the worker's error path.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::taste::TelemetryEvent;
use crate::ports::TelemetrySink;

#[derive(Debug, Default)]
pub struct InMemoryTelemetrySink {
    delivered: Mutex<Vec<TelemetryEvent>>,
    failing: AtomicBool,
}

impl InMemoryTelemetrySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects every delivery.
    pub fn failing() -> Self {
        let sink = Self::new();
        sink.set_failing(true);
        sink
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    // === Test Helpers ===

    /// Returns all delivered events.
    pub fn delivered_events(&self) -> Vec<TelemetryEvent> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns delivered events of a specific type.
    pub fn events_of_type(&self, event_type: &str) -> Vec<TelemetryEvent> {
        self.delivered_events()
            .into_iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn has_event(&self, event_type: &str) -> bool {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|e| e.event_type() == event_type)
    }
}

#[async_trait]
impl TelemetrySink for InMemoryTelemetrySink {
    async fn deliver(&self, event: TelemetryEvent) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::TelemetryUnavailable,
                "Telemetry sink rejected event",
            ));
        }
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        Ok(())
    }
}
