//! TelemetrySink port - final destination of best-effort telemetry.
//!
//! The core never calls a sink directly. Events go through the bounded
//! telemetry queue and a background worker delivers them, so a slow or
//! failing sink cannot hold up an update or an evaluation.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::taste::TelemetryEvent;

/// Port for delivering telemetry events.
///
/// Errors are logged by the worker and otherwise discarded; there is no retry.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn deliver(&self, event: TelemetryEvent) -> Result<(), DomainError>;
}
