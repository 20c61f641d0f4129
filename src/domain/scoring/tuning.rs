//! Tunable constants for evaluation and reinforcement.
//!
//! Both structs deserialize with per-field defaults so that configuration
//! only needs to name the values it overrides.

use serde::Deserialize;

use crate::domain::foundation::ValidationError;
use crate::domain::taste::{DecisionAction, IdentityVersion, DEFAULT_MAX_TAGS};

/// Parameters of the scoring evaluator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EvaluatorTuning {
    /// Both weights must exceed this magnitude (with opposite signs) to flag an axis.
    pub tension_threshold: f64,
    /// Share of confidence retained by a completely unstable identity.
    pub stability_floor: f64,
    /// Regret contribution of each tension flag.
    pub per_flag_risk: f64,
    /// How strongly low confidence feeds into regret risk.
    pub uncertainty_weight: f64,
    /// Added to the catalog's regret prior for trend-sensitive items.
    pub trend_risk_bump: f64,
    /// Maximum number of axis-based reasons rendered.
    pub max_axis_reasons: usize,
}

impl Default for EvaluatorTuning {
    fn default() -> Self {
        Self {
            tension_threshold: 0.3,
            stability_floor: 0.5,
            per_flag_risk: 0.2,
            uncertainty_weight: 0.3,
            trend_risk_bump: 0.1,
            max_axis_reasons: 3,
        }
    }
}

impl EvaluatorTuning {
    pub fn validate(&self) -> Result<(), ValidationError> {
        unit_range("scoring.tension_threshold", self.tension_threshold)?;
        unit_range("scoring.stability_floor", self.stability_floor)?;
        unit_range("scoring.per_flag_risk", self.per_flag_risk)?;
        unit_range("scoring.uncertainty_weight", self.uncertainty_weight)?;
        unit_range("scoring.trend_risk_bump", self.trend_risk_bump)?;
        Ok(())
    }
}

/// Parameters of the reinforcement update rule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReinforcementTuning {
    /// Learning rate numerator; the effective rate is `base_rate / (1 + version)`.
    pub base_rate: f64,
    pub bought_delta: f64,
    pub aligned_delta: f64,
    pub not_for_me_delta: f64,
    /// Distance at which a single step drives stability to zero.
    pub stability_distance_scale: f64,
    /// Capacity of the avoid/influence tag sets for new identities.
    pub max_tags: usize,
}

impl Default for ReinforcementTuning {
    fn default() -> Self {
        Self {
            base_rate: 0.5,
            bought_delta: 1.0,
            aligned_delta: 0.6,
            not_for_me_delta: -0.8,
            stability_distance_scale: 0.5,
            max_tags: DEFAULT_MAX_TAGS,
        }
    }
}

impl ReinforcementTuning {
    /// Signed strength of an action.
    pub fn signed_delta(&self, action: DecisionAction) -> f64 {
        match action {
            DecisionAction::Bought => self.bought_delta,
            DecisionAction::Aligned => self.aligned_delta,
            DecisionAction::NotForMe => self.not_for_me_delta,
        }
    }

    /// Effective per-event learning rate for an identity at `version`.
    pub fn learning_rate(&self, version: IdentityVersion) -> f64 {
        self.base_rate / (1.0 + f64::from(version.as_u32()))
    }

    /// Checks `bought > aligned > 0 > not_for_me` and positive scales.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.base_rate.is_finite() && self.base_rate > 0.0) {
            return Err(ValidationError::invalid_format(
                "reinforcement.base_rate",
                "must be a positive number",
            ));
        }
        if !(self.bought_delta > self.aligned_delta
            && self.aligned_delta > 0.0
            && self.not_for_me_delta < 0.0)
        {
            return Err(ValidationError::invalid_format(
                "reinforcement",
                format!(
                    "deltas must satisfy bought > aligned > 0 > not_for_me, got {} / {} / {}",
                    self.bought_delta, self.aligned_delta, self.not_for_me_delta
                ),
            ));
        }
        if !(self.stability_distance_scale.is_finite() && self.stability_distance_scale > 0.0) {
            return Err(ValidationError::invalid_format(
                "reinforcement.stability_distance_scale",
                "must be a positive number",
            ));
        }
        if self.max_tags == 0 {
            return Err(ValidationError::invalid_format(
                "reinforcement.max_tags",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

fn unit_range(field: &str, value: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::invalid_format(
            field,
            format!("expected a value in [0, 1], got {}", value),
        ))
    }
}
