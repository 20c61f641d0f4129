//! Telemetry events emitted by the taste core.
//!
//! These are best-effort reports for analytics; nothing in the core waits
//! on their delivery.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CatalogItemId, DecisionEventId, ProfileId, Timestamp};

use super::{DecisionAction, TasteDomain};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// A fresh identity was created because none was stored.
    IdentityCreated {
        profile_id: ProfileId,
        domain: TasteDomain,
        created_at: Timestamp,
    },

    /// A decision was folded into a new identity version.
    IdentityUpdated {
        profile_id: ProfileId,
        event_id: DecisionEventId,
        action: DecisionAction,
        version: u32,
        stability: f64,
        persisted: bool,
        updated_at: Timestamp,
    },

    /// Saving a new identity version failed; the in-memory version may be ahead.
    IdentityPersistenceFailed {
        profile_id: ProfileId,
        version: u32,
        error: String,
        failed_at: Timestamp,
    },

    /// An item was scored.
    ObjectEvaluated {
        profile_id: ProfileId,
        item_id: CatalogItemId,
        alignment_score: u8,
        identity_version: u32,
        evaluated_at: Timestamp,
    },
}

impl TelemetryEvent {
    /// Routing name, e.g. `identity_updated`.
    pub fn event_type(&self) -> &'static str {
        match self {
            TelemetryEvent::IdentityCreated { .. } => "identity_created",
            TelemetryEvent::IdentityUpdated { .. } => "identity_updated",
            TelemetryEvent::IdentityPersistenceFailed { .. } => "identity_persistence_failed",
            TelemetryEvent::ObjectEvaluated { .. } => "object_evaluated",
        }
    }

    pub fn profile_id(&self) -> &ProfileId {
        match self {
            TelemetryEvent::IdentityCreated { profile_id, .. }
            | TelemetryEvent::IdentityUpdated { profile_id, .. }
            | TelemetryEvent::IdentityPersistenceFailed { profile_id, .. }
            | TelemetryEvent::ObjectEvaluated { profile_id, .. } => profile_id,
        }
    }
}
