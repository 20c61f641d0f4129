//! TelemetryWorker - background delivery of queued telemetry.
//!
//! Drains the bounded queue into a [`TelemetrySink`]. Delivery is
//! fire-and-forget: a failed delivery is logged at `warn` and dropped, with
//! no retry.
//!
//! ## Graceful Shutdown
//!
//! The worker listens for a shutdown signal and delivers whatever is still
//! queued before stopping. It also stops once every queue handle is dropped.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::domain::taste::TelemetryEvent;
use crate::ports::TelemetrySink;

/// Counters reported when the worker stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    pub delivered: usize,
    pub failed: usize,
}

impl DeliveryStats {
    fn record(&mut self, other: DeliveryStats) {
        self.delivered += other.delivered;
        self.failed += other.failed;
    }
}

pub struct TelemetryWorker {
    receiver: mpsc::Receiver<TelemetryEvent>,
    sink: Arc<dyn TelemetrySink>,
}

impl TelemetryWorker {
    pub fn new(receiver: mpsc::Receiver<TelemetryEvent>, sink: Arc<dyn TelemetrySink>) -> Self {
        Self { receiver, sink }
    }

    /// Run the delivery loop until shutdown or until the queue closes.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> DeliveryStats {
        let mut stats = DeliveryStats::default();

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    // a dropped shutdown sender counts as a shutdown request
                    if changed.is_err() || *shutdown.borrow() {
                        stats.record(self.process_pending().await);
                        debug!(delivered = stats.delivered, failed = stats.failed, "Telemetry worker stopped");
                        return stats;
                    }
                }

                next = self.receiver.recv() => {
                    match next {
                        Some(event) => stats.record(self.deliver(event).await),
                        None => {
                            debug!(delivered = stats.delivered, failed = stats.failed, "Telemetry queue closed");
                            return stats;
                        }
                    }
                }
            }
        }
    }

    /// Delivers everything currently queued without waiting for more.
    ///
    /// Also useful for testing without running the full loop.
    pub async fn process_pending(&mut self) -> DeliveryStats {
        let mut stats = DeliveryStats::default();
        while let Ok(event) = self.receiver.try_recv() {
            stats.record(self.deliver(event).await);
        }
        stats
    }

    async fn deliver(&self, event: TelemetryEvent) -> DeliveryStats {
        let event_type = event.event_type();
        match self.sink.deliver(event).await {
            Ok(()) => DeliveryStats {
                delivered: 1,
                failed: 0,
            },
            Err(e) => {
                warn!(event_type, error = %e, "Failed to deliver telemetry event");
                DeliveryStats {
                    delivered: 0,
                    failed: 1,
                }
            }
        }
    }
}
