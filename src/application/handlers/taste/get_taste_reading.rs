//! GetTasteReadingHandler - Query handler for the human-facing summary of
//! an identity: presentation axis scores plus a one-line reading.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::application::IdentityCoordinator;
use crate::domain::foundation::{DomainError, ProfileId};
use crate::domain::scoring::{AxisMapping, PresentationAxis};

#[derive(Debug, Clone)]
pub struct GetTasteReadingQuery {
    pub profile_id: ProfileId,
    /// Name used in the sentence; blank falls back to a generic subject.
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TasteReading {
    pub profile_id: ProfileId,
    pub identity_version: u32,
    pub stability: f64,
    pub axis_scores: BTreeMap<PresentationAxis, f64>,
    pub reading: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum GetTasteReadingError {
    #[error("{0}")]
    Domain(#[from] DomainError),
}

pub struct GetTasteReadingHandler {
    coordinator: Arc<IdentityCoordinator>,
}

impl GetTasteReadingHandler {
    pub fn new(coordinator: Arc<IdentityCoordinator>) -> Self {
        Self { coordinator }
    }

    pub async fn handle(
        &self,
        query: GetTasteReadingQuery,
    ) -> Result<TasteReading, GetTasteReadingError> {
        // one snapshot for scores and version alike
        let identity = self
            .coordinator
            .current(&query.profile_id)
            .await?;

        let axis_scores = AxisMapping::compute_axis_scores(identity.vector());
        let reading = AxisMapping::one_line_reading(&query.display_name, &axis_scores);

        Ok(TasteReading {
            profile_id: query.profile_id,
            identity_version: identity.version().as_u32(),
            stability: identity.stability().value(),
            axis_scores,
            reading,
        })
    }
}
