//! Bounded, non-blocking telemetry queue.
//!
//! The producing side never waits: when the queue is full or the worker is
//! gone the event is dropped and a debug line is logged.

use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::taste::TelemetryEvent;

/// Cloneable producer handle held by the coordinator.
#[derive(Debug, Clone)]
pub struct TelemetryQueue {
    sender: Option<mpsc::Sender<TelemetryEvent>>,
}

impl TelemetryQueue {
    /// A queue holding at most `capacity` undelivered events, plus the
    /// receiving end to hand to a [`super::TelemetryWorker`].
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<TelemetryEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// A queue that discards everything.
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Enqueues an event without waiting. Returns false if it was dropped.
    pub fn emit(&self, event: TelemetryEvent) -> bool {
        let Some(sender) = &self.sender else {
            return false;
        };

        match sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(event)) => {
                debug!(
                    event_type = event.event_type(),
                    profile_id = %event.profile_id(),
                    "Telemetry queue full, dropping event"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                debug!(
                    event_type = event.event_type(),
                    "Telemetry worker stopped, dropping event"
                );
                false
            }
        }
    }
}
