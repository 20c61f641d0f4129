//! EvaluateCatalogHandler - Query handler scoring a profile's catalog.

use std::sync::Arc;

use tracing::debug;

use crate::application::IdentityCoordinator;
use crate::domain::foundation::{CommandMetadata, DomainError, ProfileId};
use crate::domain::taste::{IdentityVersion, TasteEvaluatedObject};

/// Query for ranked evaluations of every item in the profile's domain.
#[derive(Debug, Clone)]
pub struct EvaluateCatalogQuery {
    pub profile_id: ProfileId,
    /// Keep only the best `limit` results.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct EvaluateCatalogResult {
    /// Best fit first.
    pub evaluations: Vec<TasteEvaluatedObject>,
    /// Identity version the scores were computed against.
    pub identity_version: IdentityVersion,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum EvaluateCatalogError {
    #[error("{0}")]
    Domain(#[from] DomainError),
}

pub struct EvaluateCatalogHandler {
    coordinator: Arc<IdentityCoordinator>,
}

impl EvaluateCatalogHandler {
    pub fn new(coordinator: Arc<IdentityCoordinator>) -> Self {
        Self { coordinator }
    }

    pub async fn handle(
        &self,
        query: EvaluateCatalogQuery,
        metadata: CommandMetadata,
    ) -> Result<EvaluateCatalogResult, EvaluateCatalogError> {
        let evaluations = self
            .coordinator
            .evaluate_catalog(&query.profile_id, query.limit)
            .await?;

        // every evaluation in one call shares a snapshot
        let identity_version = match evaluations.first() {
            Some(first) => first.identity_version_used(),
            None => self
                .coordinator
                .snapshot(&query.profile_id)
                .await
                .map(|identity| identity.version())
                .unwrap_or_default(),
        };

        debug!(
            correlation_id = %metadata.correlation_id(),
            profile_id = %query.profile_id,
            count = evaluations.len(),
            "Evaluated catalog"
        );

        Ok(EvaluateCatalogResult {
            evaluations,
            identity_version,
        })
    }
}
