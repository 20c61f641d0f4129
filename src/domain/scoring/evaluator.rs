//! Evaluator - scores a catalog item against an identity snapshot.
//!
//! Pure and deterministic: the same identity and item always produce the
//! same outcome (only the evaluation id and creation time differ). Sparse
//! items are never an error; missing axes just lower coverage and with it
//! confidence.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::domain::foundation::{AlignmentScore, Timestamp, UnitInterval};
use crate::domain::taste::{humanize_axis, CatalogItem, TasteEvaluatedObject, TasteIdentity};

use super::EvaluatorTuning;

/// Vectors with a norm below this are treated as carrying no direction.
pub const NORM_EPSILON: f64 = 1e-9;

/// One axis present on both the identity and the item.
#[derive(Debug, Clone, PartialEq)]
struct SharedAxis<'a> {
    axis: &'a str,
    identity: f64,
    item: f64,
}

/// Stateless scoring service.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    tuning: EvaluatorTuning,
}

impl Evaluator {
    pub fn new(tuning: EvaluatorTuning) -> Self {
        Self { tuning }
    }

    pub fn tuning(&self) -> &EvaluatorTuning {
        &self.tuning
    }

    /// Evaluates `item` against `identity`, stamped with the current time.
    pub fn evaluate(&self, identity: &TasteIdentity, item: &CatalogItem) -> TasteEvaluatedObject {
        self.evaluate_at(identity, item, Timestamp::now())
    }

    /// Evaluates `item` against `identity` with an explicit creation time.
    pub fn evaluate_at(
        &self,
        identity: &TasteIdentity,
        item: &CatalogItem,
        created_at: Timestamp,
    ) -> TasteEvaluatedObject {
        let shared = Self::shared_axes(identity, item);
        let identity_norm = norm(shared.iter().map(|s| s.identity));
        let item_norm = norm(shared.iter().map(|s| s.item));

        let similarity = Self::similarity(&shared, identity_norm, item_norm);
        let alignment = AlignmentScore::from_similarity(similarity);

        let coverage = Self::coverage(identity, shared.len());
        let confidence = self.confidence(coverage, identity.stability());

        let item_tags = item.attributes.normalized_tags();
        let avoided: Vec<&String> = item_tags
            .iter()
            .filter(|t| identity.vector().avoids().contains(t))
            .collect();
        let influenced: Vec<&String> = item_tags
            .iter()
            .filter(|t| identity.vector().influences().contains(t))
            .collect();

        let mut tension_flags = BTreeSet::new();
        for s in &shared {
            if self.is_tense(s) {
                tension_flags.insert(format!("axis:{}", s.axis));
            }
        }
        for tag in &avoided {
            tension_flags.insert(format!("avoid:{}", tag));
        }

        let risk = self.risk_of_regret(tension_flags.len(), confidence, item);

        let mut reasons = self.axis_reasons(&shared, identity_norm, item_norm);
        reasons.extend(
            avoided
                .iter()
                .map(|tag| format!("Tagged '{}', which you tend to avoid", tag)),
        );
        reasons.extend(
            influenced
                .iter()
                .map(|tag| format!("Tagged '{}', one of your influences", tag)),
        );

        TasteEvaluatedObject::new(
            item.id.clone(),
            i64::from(alignment.value()),
            confidence.value(),
            tension_flags,
            risk.value(),
            reasons,
            identity.version(),
            created_at,
        )
    }

    fn shared_axes<'a>(identity: &TasteIdentity, item: &'a CatalogItem) -> Vec<SharedAxis<'a>> {
        item.attributes
            .weights
            .iter()
            .filter_map(|(axis, item_weight)| {
                identity.vector().weight(axis).map(|identity_weight| SharedAxis {
                    axis: axis.as_str(),
                    identity: identity_weight.value(),
                    item: item_weight.value(),
                })
            })
            .collect()
    }

    /// Cosine similarity over the shared axes; 0 when either side has no direction.
    fn similarity(shared: &[SharedAxis<'_>], identity_norm: f64, item_norm: f64) -> f64 {
        if identity_norm < NORM_EPSILON || item_norm < NORM_EPSILON {
            return 0.0;
        }
        let dot: f64 = shared.iter().map(|s| s.identity * s.item).sum();
        (dot / (identity_norm * item_norm)).clamp(-1.0, 1.0)
    }

    /// Fraction of the identity's taxonomy the item speaks to.
    fn coverage(identity: &TasteIdentity, shared: usize) -> f64 {
        let total = identity.vector().weights().len();
        if total == 0 {
            return 0.0;
        }
        (shared as f64 / total as f64).min(1.0)
    }

    /// `coverage * (floor + (1 - floor) * stability)`.
    ///
    /// Non-decreasing in both inputs; `coverage` itself is the ceiling.
    fn confidence(&self, coverage: f64, stability: UnitInterval) -> UnitInterval {
        let floor = self.tuning.stability_floor;
        UnitInterval::new(coverage * (floor + (1.0 - floor) * stability.value()))
    }

    fn is_tense(&self, s: &SharedAxis<'_>) -> bool {
        let threshold = self.tuning.tension_threshold;
        s.identity * s.item < 0.0 && s.identity.abs() > threshold && s.item.abs() > threshold
    }

    /// `1 - (1 - tension)(1 - uncertainty)(1 - catalog)`.
    fn risk_of_regret(&self, flags: usize, confidence: UnitInterval, item: &CatalogItem) -> UnitInterval {
        let per_flag = self.tuning.per_flag_risk.clamp(0.0, 1.0);
        let flags = i32::try_from(flags).unwrap_or(i32::MAX);
        let tension = 1.0 - (1.0 - per_flag).powi(flags);
        let uncertainty = self.tuning.uncertainty_weight * confidence.complement().value();
        let catalog = item
            .risk
            .map(|r| {
                let bump = if r.trend_sensitive {
                    self.tuning.trend_risk_bump
                } else {
                    0.0
                };
                (r.regret_prior.value() + bump).min(1.0)
            })
            .unwrap_or(0.0);

        UnitInterval::new(1.0 - (1.0 - tension) * (1.0 - uncertainty) * (1.0 - catalog))
    }

    /// Reasons from per-axis contributions to the cosine, strongest first.
    fn axis_reasons(&self, shared: &[SharedAxis<'_>], identity_norm: f64, item_norm: f64) -> Vec<String> {
        if identity_norm < NORM_EPSILON || item_norm < NORM_EPSILON {
            return Vec::new();
        }

        let mut contributions: Vec<(&str, f64)> = shared
            .iter()
            .map(|s| (s.axis, s.identity * s.item / (identity_norm * item_norm)))
            .filter(|(_, c)| *c != 0.0)
            .collect();
        contributions.sort_by(|(a_axis, a), (b_axis, b)| {
            b.abs()
                .partial_cmp(&a.abs())
                .unwrap_or(Ordering::Equal)
                .then_with(|| a_axis.cmp(b_axis))
        });

        contributions
            .into_iter()
            .take(self.tuning.max_axis_reasons)
            .map(|(axis, contribution)| {
                if contribution > 0.0 {
                    format!("Matches your stance on {}", humanize_axis(axis))
                } else {
                    format!("Clashes with your stance on {}", humanize_axis(axis))
                }
            })
            .collect()
    }
}

fn norm(values: impl Iterator<Item = f64>) -> f64 {
    values.map(|v| v * v).sum::<f64>().sqrt()
}
