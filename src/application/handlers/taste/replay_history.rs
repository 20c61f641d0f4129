//! ReplayHistoryHandler - Command handler rebuilding an identity from the
//! profile's full decision log.
//!
//! This is the batch counterpart of `RecordDecisionHandler`: instead of
//! streaming events one at a time it folds the whole history from a fresh
//! identity, which also repairs an identity whose saves were lost.

use std::sync::Arc;

use tracing::info;

use crate::application::{IdentityCoordinator, ReplayOutcome};
use crate::domain::foundation::{CommandMetadata, DomainError, ProfileId};
use crate::domain::taste::TasteDomain;

#[derive(Debug, Clone)]
pub struct ReplayHistoryCommand {
    pub profile_id: ProfileId,
    pub domain: TasteDomain,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ReplayHistoryError {
    #[error("{0}")]
    Domain(#[from] DomainError),
}

pub struct ReplayHistoryHandler {
    coordinator: Arc<IdentityCoordinator>,
}

impl ReplayHistoryHandler {
    pub fn new(coordinator: Arc<IdentityCoordinator>) -> Self {
        Self { coordinator }
    }

    pub async fn handle(
        &self,
        cmd: ReplayHistoryCommand,
        metadata: CommandMetadata,
    ) -> Result<ReplayOutcome, ReplayHistoryError> {
        let outcome = self
            .coordinator
            .replay_history(&cmd.profile_id, cmd.domain)
            .await?;

        info!(
            correlation_id = %metadata.correlation_id(),
            profile_id = %cmd.profile_id,
            applied = outcome.applied,
            skipped = outcome.skipped.len(),
            "Replay finished"
        );

        Ok(outcome)
    }
}
