//! RecordDecisionHandler - Command handler for folding a user decision into
//! the profile's taste identity.
//!
//! The coordinator appends the decision to its log before applying it, so
//! the log stays the complete history even when the identity update fails.

use std::sync::Arc;

use tracing::debug;

use crate::application::{IdentityCoordinator, RecordOutcome};
use crate::domain::foundation::{CatalogItemId, CommandMetadata, DomainError, ProfileId, Timestamp};
use crate::domain::taste::{DecisionAction, DecisionEvent, TasteDomain, TasteIdentity};

/// Command to record one decision.
#[derive(Debug, Clone)]
pub struct RecordDecisionCommand {
    pub profile_id: ProfileId,
    /// Domain of the profile's identity; opened on demand.
    pub domain: TasteDomain,
    pub item_id: CatalogItemId,
    pub action: DecisionAction,
    /// Defaults to now.
    pub occurred_at: Option<Timestamp>,
}

/// Result of recording a decision.
#[derive(Debug, Clone)]
pub struct RecordDecisionResult {
    pub event: DecisionEvent,
    pub identity: Arc<TasteIdentity>,
    pub persisted: bool,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RecordDecisionError {
    #[error("{0}")]
    Domain(#[from] DomainError),
}

pub struct RecordDecisionHandler {
    coordinator: Arc<IdentityCoordinator>,
}

impl RecordDecisionHandler {
    pub fn new(coordinator: Arc<IdentityCoordinator>) -> Self {
        Self { coordinator }
    }

    pub async fn handle(
        &self,
        cmd: RecordDecisionCommand,
        metadata: CommandMetadata,
    ) -> Result<RecordDecisionResult, RecordDecisionError> {
        // 1. Make sure the identity is loaded
        self.coordinator.open(&cmd.profile_id, cmd.domain).await?;

        // 2. Build the event
        let event = DecisionEvent::new(
            cmd.profile_id,
            cmd.item_id,
            cmd.action,
            cmd.occurred_at.unwrap_or_else(Timestamp::now),
        );

        debug!(
            correlation_id = %metadata.correlation_id(),
            source = metadata.source().unwrap_or("unknown"),
            event_id = %event.id(),
            "Recording decision"
        );

        // 3. Log and fold into the identity
        let RecordOutcome {
            identity,
            persisted,
        } = self.coordinator.record_decision(&event).await?;

        Ok(RecordDecisionResult {
            event,
            identity,
            persisted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryDecisionLog, InMemoryIdentityStore, StaticCatalog};
    use crate::domain::foundation::ErrorCode;
    use crate::domain::taste::{CatalogItem, ItemAttributes};
    use crate::ports::DecisionEventSource;
    use async_trait::async_trait;

    // ─────────────────────────────────────────────────────────────────────
    // Mock implementations
    // ─────────────────────────────────────────────────────────────────────

    struct UnavailableLog;

    #[async_trait]
    impl DecisionEventSource for UnavailableLog {
        async fn events_for(&self, _: &ProfileId) -> Result<Vec<DecisionEvent>, DomainError> {
            Ok(Vec::new())
        }

        async fn append(&self, _: &DecisionEvent) -> Result<(), DomainError> {
            Err(DomainError::new(
                ErrorCode::DecisionLogUnavailable,
                "Simulated log failure",
            ))
        }
    }

    fn profile() -> ProfileId {
        ProfileId::new("ada").unwrap()
    }

    fn setup(log: Arc<dyn DecisionEventSource>) -> RecordDecisionHandler {
        let catalog = StaticCatalog::new([CatalogItem::new(
            CatalogItemId::new("walnut-desk").unwrap(),
            TasteDomain::Objects,
            ItemAttributes::new()
                .with_weight("craftsmanship", 0.9)
                .with_tag("walnut"),
        )]);
        let coordinator = Arc::new(IdentityCoordinator::new(
            Arc::new(InMemoryIdentityStore::new()),
            Arc::new(catalog),
            log,
        ));
        RecordDecisionHandler::new(coordinator)
    }

    fn command(item: &str, action: DecisionAction) -> RecordDecisionCommand {
        RecordDecisionCommand {
            profile_id: profile(),
            domain: TasteDomain::Objects,
            item_id: CatalogItemId::new(item).unwrap(),
            action,
            occurred_at: Some(Timestamp::from_unix_secs(1704326400)),
        }
    }

    #[tokio::test]
    async fn records_and_logs_decision() {
        let log = Arc::new(InMemoryDecisionLog::new());
        let handler = setup(log.clone());

        let result = handler
            .handle(command("walnut-desk", DecisionAction::Bought), CommandMetadata::new())
            .await
            .unwrap();

        assert_eq!(result.identity.version().as_u32(), 2);
        assert!(result.persisted);
        assert!(result.identity.vector().weight("craftsmanship").unwrap().value() > 0.0);
        assert_eq!(log.events_for(&profile()).await.unwrap(), vec![result.event]);
    }

    #[tokio::test]
    async fn unknown_item_is_logged_but_not_applied() {
        let log = Arc::new(InMemoryDecisionLog::new());
        let handler = setup(log.clone());

        let err = handler
            .handle(command("ghost", DecisionAction::Aligned), CommandMetadata::new())
            .await
            .unwrap_err();

        let RecordDecisionError::Domain(err) = err;
        assert_eq!(err.code, ErrorCode::CatalogItemNotFound);
        assert_eq!(log.event_count().await, 1);
    }

    #[tokio::test]
    async fn log_failure_stops_the_update() {
        let handler = setup(Arc::new(UnavailableLog));

        let err = handler
            .handle(
                command("walnut-desk", DecisionAction::Bought),
                CommandMetadata::new().with_correlation_id("req-1"),
            )
            .await
            .unwrap_err();

        let RecordDecisionError::Domain(err) = err;
        assert_eq!(err.code, ErrorCode::DecisionLogUnavailable);
        let snapshot = handler.coordinator.snapshot(&profile()).await.unwrap();
        assert_eq!(snapshot.version().as_u32(), 1);
    }
}
