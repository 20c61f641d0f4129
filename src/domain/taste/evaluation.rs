//! TasteEvaluatedObject: the scored result of one evaluation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::{
    AlignmentScore, CatalogItemId, EvaluationId, Timestamp, UnitInterval,
};

use super::IdentityVersion;

/// Scored fit of one catalog item against one identity version.
///
/// The constructor enforces the same bounds as the evaluator, so a caller
/// that assembles one by hand cannot produce out-of-range values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasteEvaluatedObject {
    id: EvaluationId,
    item_id: CatalogItemId,
    alignment_score: AlignmentScore,
    confidence: UnitInterval,
    tension_flags: BTreeSet<String>,
    risk_of_regret: UnitInterval,
    reasons: Vec<String>,
    identity_version_used: IdentityVersion,
    created_at: Timestamp,
}

impl TasteEvaluatedObject {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        item_id: CatalogItemId,
        alignment_score: i64,
        confidence: f64,
        tension_flags: BTreeSet<String>,
        risk_of_regret: f64,
        reasons: Vec<String>,
        identity_version_used: IdentityVersion,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: EvaluationId::new(),
            item_id,
            alignment_score: AlignmentScore::new(alignment_score),
            confidence: UnitInterval::new(confidence),
            tension_flags,
            risk_of_regret: UnitInterval::new(risk_of_regret),
            reasons,
            identity_version_used,
            created_at,
        }
    }

    pub fn id(&self) -> EvaluationId {
        self.id
    }

    pub fn item_id(&self) -> &CatalogItemId {
        &self.item_id
    }

    pub fn alignment_score(&self) -> AlignmentScore {
        self.alignment_score
    }

    pub fn confidence(&self) -> UnitInterval {
        self.confidence
    }

    pub fn tension_flags(&self) -> &BTreeSet<String> {
        &self.tension_flags
    }

    pub fn risk_of_regret(&self) -> UnitInterval {
        self.risk_of_regret
    }

    /// Most significant first.
    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    pub fn identity_version_used(&self) -> IdentityVersion {
        self.identity_version_used
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// True if both evaluations agree on everything except id and creation time.
    pub fn same_outcome(&self, other: &TasteEvaluatedObject) -> bool {
        self.item_id == other.item_id
            && self.alignment_score == other.alignment_score
            && self.confidence == other.confidence
            && self.tension_flags == other.tension_flags
            && self.risk_of_regret == other.risk_of_regret
            && self.reasons == other.reasons
            && self.identity_version_used == other.identity_version_used
    }
}
