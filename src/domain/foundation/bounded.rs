//! Bounded numeric value objects.
//!
//! Every constructor clamps instead of rejecting: out-of-range or non-finite
//! input is silently corrected to the nearest valid value (NaN becomes the
//! neutral value of the type).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Clamps to `[min, max]`, mapping non-finite input to `fallback`.
pub fn clamp_finite(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        return fallback;
    }
    value.clamp(min, max)
}

/// Integer alignment score between 0 and 100 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct AlignmentScore(u8);

impl AlignmentScore {
    /// Neutral midpoint.
    pub const NEUTRAL: Self = Self(50);

    /// Creates a score, clamping to 0-100.
    pub fn new(value: i64) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    /// Maps a similarity in [-1, 1] onto 0-100, rounding to nearest.
    pub fn from_similarity(similarity: f64) -> Self {
        let similarity = clamp_finite(similarity, -1.0, 1.0, 0.0);
        Self::new(((similarity + 1.0) / 2.0 * 100.0).round() as i64)
    }

    /// Returns the value as u8.
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl From<i64> for AlignmentScore {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<AlignmentScore> for u8 {
    fn from(score: AlignmentScore) -> Self {
        score.0
    }
}

impl fmt::Display for AlignmentScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/100", self.0)
    }
}

/// A float in [0, 1] (confidence, stability, risk).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct UnitInterval(f64);

impl UnitInterval {
    pub const ZERO: Self = Self(0.0);
    pub const ONE: Self = Self(1.0);

    /// Creates a value, clamping to [0, 1]. NaN becomes 0.
    pub fn new(value: f64) -> Self {
        Self(clamp_finite(value, 0.0, 1.0, 0.0))
    }

    /// Creates a value, returning error if outside [0, 1].
    pub fn try_new(field: &str, value: f64) -> Result<Self, ValidationError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::invalid_format(
                field,
                format!("expected a value in [0, 1], got {}", value),
            ));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Returns `1 - self`.
    pub fn complement(&self) -> Self {
        Self(1.0 - self.0)
    }
}

impl Default for UnitInterval {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f64> for UnitInterval {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<UnitInterval> for f64 {
    fn from(value: UnitInterval) -> Self {
        value.0
    }
}

impl fmt::Display for UnitInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Signed axis weight in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Weight(f64);

impl Weight {
    pub const ZERO: Self = Self(0.0);

    /// Creates a weight, clamping to [-1, 1]. NaN becomes 0.
    pub fn new(value: f64) -> Self {
        Self(clamp_finite(value, -1.0, 1.0, 0.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn magnitude(&self) -> f64 {
        self.0.abs()
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f64> for Weight {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Weight> for f64 {
    fn from(value: Weight) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_score_clamps_to_range() {
        assert_eq!(AlignmentScore::new(-5).value(), 0);
        assert_eq!(AlignmentScore::new(50).value(), 50);
        assert_eq!(AlignmentScore::new(250).value(), 100);
    }

    #[test]
    fn alignment_score_maps_similarity_endpoints() {
        assert_eq!(AlignmentScore::from_similarity(-1.0).value(), 0);
        assert_eq!(AlignmentScore::from_similarity(0.0).value(), 50);
        assert_eq!(AlignmentScore::from_similarity(1.0).value(), 100);
        assert_eq!(AlignmentScore::from_similarity(0.5).value(), 75);
    }

    #[test]
    fn alignment_score_treats_nan_as_neutral() {
        assert_eq!(AlignmentScore::from_similarity(f64::NAN), AlignmentScore::NEUTRAL);
    }

    #[test]
    fn alignment_score_deserializes_with_clamping() {
        let score: AlignmentScore = serde_json::from_str("140").unwrap();
        assert_eq!(score.value(), 100);
    }

    #[test]
    fn unit_interval_clamps_and_sanitises() {
        assert_eq!(UnitInterval::new(-0.2).value(), 0.0);
        assert_eq!(UnitInterval::new(1.7).value(), 1.0);
        assert_eq!(UnitInterval::new(f64::NAN).value(), 0.0);
        assert_eq!(UnitInterval::new(f64::INFINITY).value(), 1.0);
    }

    #[test]
    fn unit_interval_try_new_rejects_out_of_range() {
        assert!(UnitInterval::try_new("stability", 0.4).is_ok());
        assert!(UnitInterval::try_new("stability", 1.4).is_err());
    }

    #[test]
    fn unit_interval_complement() {
        assert!((UnitInterval::new(0.25).complement().value() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn weight_clamps_to_signed_unit_range() {
        assert_eq!(Weight::new(-3.0).value(), -1.0);
        assert_eq!(Weight::new(0.4).value(), 0.4);
        assert_eq!(Weight::new(2.0).value(), 1.0);
        assert_eq!(Weight::new(f64::NAN).value(), 0.0);
        assert_eq!(Weight::new(-0.6).magnitude(), 0.6);
    }
}
