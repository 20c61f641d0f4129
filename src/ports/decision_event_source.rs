//! DecisionEventSource port - the append-only log of user decisions.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ProfileId};
use crate::domain::taste::DecisionEvent;

/// Port for reading (and appending to) a profile's decision history.
///
/// Events are returned in append order. Callers that need timestamp order
/// sort them themselves.
#[async_trait]
pub trait DecisionEventSource: Send + Sync {
    /// Every recorded decision of the profile.
    async fn events_for(&self, profile_id: &ProfileId) -> Result<Vec<DecisionEvent>, DomainError>;

    /// Appends a decision to the log.
    async fn append(&self, event: &DecisionEvent) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn DecisionEventSource) {}
}
