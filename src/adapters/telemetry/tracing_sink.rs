//! Telemetry sink that writes events to the tracing pipeline.
//!
//! With JSON logging enabled this yields one structured record per event,
//! which is all the binary needs for analytics.

use async_trait::async_trait;
use tracing::info;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::taste::TelemetryEvent;
use crate::ports::TelemetrySink;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetrySink;

impl TracingTelemetrySink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TelemetrySink for TracingTelemetrySink {
    async fn deliver(&self, event: TelemetryEvent) -> Result<(), DomainError> {
        let payload = serde_json::to_string(&event).map_err(|e| {
            DomainError::new(
                ErrorCode::TelemetryUnavailable,
                format!("Failed to serialize telemetry event: {}", e),
            )
        })?;

        info!(
            target: "taste_identity::telemetry",
            event_type = event.event_type(),
            profile_id = %event.profile_id(),
            payload = %payload,
            "telemetry"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ProfileId, Timestamp};
    use crate::domain::taste::TasteDomain;

    #[tokio::test]
    async fn deliver_never_fails_for_valid_events() {
        let event = TelemetryEvent::IdentityCreated {
            profile_id: ProfileId::new("ada").unwrap(),
            domain: TasteDomain::Art,
            created_at: Timestamp::now(),
        };
        assert!(TracingTelemetrySink::new().deliver(event).await.is_ok());
    }
}
