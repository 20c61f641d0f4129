//! AxisMapping - projects taxonomy weights onto presentation axes.
//!
//! Each presentation axis is a fixed linear combination of taxonomy axes.
//! The score is `sum(c_i * w_i) / sum(|c_i|)` over the coefficients whose
//! axis exists in the vector, so it always stays within [-1, 1]. Axes from
//! other domains simply do not contribute.
//!
//! | Presentation | + pole    | - pole        | Main contributors                                  |
//! |--------------|-----------|---------------|----------------------------------------------------|
//! | calm         | calm      | energetic     | minimalist, monochrome, symmetry vs bold_color     |
//! | heritage     | timeless  | contemporary  | vintage, classical, craftsmanship vs abstract      |
//! | play         | playful   | serious       | playful, surreal, bold_color vs utilitarian        |
//! | warmth       | warm      | cool          | warm, cozy, natural_materials vs industrial        |

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::taste::TasteVector;

/// Scores below this magnitude are treated as noise by [`AxisMapping::one_line_reading`].
pub const READING_NOISE_FLOOR: f64 = 0.05;

/// Small human-facing axis derived from the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationAxis {
    Calm,
    Heritage,
    Play,
    Warmth,
}

const CALM: &[(&str, f64)] = &[
    ("minimalist", 1.0),
    ("monochrome", 0.6),
    ("symmetry", 0.5),
    ("natural_materials", 0.3),
    ("bold_color", -0.8),
    ("surreal", -0.5),
    ("playful", -0.4),
];

const HERITAGE: &[(&str, f64)] = &[
    ("vintage", 1.0),
    ("classical", 1.0),
    ("craftsmanship", 0.7),
    ("figurative", 0.5),
    ("natural_materials", 0.2),
    ("abstract", -0.6),
    ("industrial", -0.4),
    ("surreal", -0.3),
];

const PLAY: &[(&str, f64)] = &[
    ("playful", 1.0),
    ("surreal", 0.8),
    ("bold_color", 0.6),
    ("abstract", 0.3),
    ("utilitarian", -0.8),
    ("classical", -0.4),
    ("luxury", -0.3),
    ("monochrome", -0.3),
];

const WARMTH: &[(&str, f64)] = &[
    ("warm", 1.0),
    ("cozy", 0.8),
    ("natural_materials", 0.6),
    ("textured", 0.5),
    ("craftsmanship", 0.3),
    ("industrial", -0.8),
    ("monochrome", -0.4),
    ("minimalist", -0.2),
];

impl PresentationAxis {
    pub fn all() -> &'static [PresentationAxis] {
        &[
            PresentationAxis::Calm,
            PresentationAxis::Heritage,
            PresentationAxis::Play,
            PresentationAxis::Warmth,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PresentationAxis::Calm => "calm",
            PresentationAxis::Heritage => "heritage",
            PresentationAxis::Play => "play",
            PresentationAxis::Warmth => "warmth",
        }
    }

    /// Word for a positive score.
    pub fn positive_pole(&self) -> &'static str {
        match self {
            PresentationAxis::Calm => "calm",
            PresentationAxis::Heritage => "timeless",
            PresentationAxis::Play => "playful",
            PresentationAxis::Warmth => "warm",
        }
    }

    /// Word for a negative score.
    pub fn negative_pole(&self) -> &'static str {
        match self {
            PresentationAxis::Calm => "energetic",
            PresentationAxis::Heritage => "contemporary",
            PresentationAxis::Play => "serious",
            PresentationAxis::Warmth => "cool",
        }
    }

    pub fn pole(&self, score: f64) -> &'static str {
        if score < 0.0 {
            self.negative_pole()
        } else {
            self.positive_pole()
        }
    }

    /// Taxonomy coefficients of this axis.
    pub fn coefficients(&self) -> &'static [(&'static str, f64)] {
        match self {
            PresentationAxis::Calm => CALM,
            PresentationAxis::Heritage => HERITAGE,
            PresentationAxis::Play => PLAY,
            PresentationAxis::Warmth => WARMTH,
        }
    }
}

impl fmt::Display for PresentationAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stateless projector from taste vectors to presentation axes.
pub struct AxisMapping;

impl AxisMapping {
    /// Scores every presentation axis in [-1, 1].
    pub fn compute_axis_scores(vector: &TasteVector) -> BTreeMap<PresentationAxis, f64> {
        PresentationAxis::all()
            .iter()
            .map(|axis| (*axis, Self::project(vector, axis.coefficients())))
            .collect()
    }

    fn project(vector: &TasteVector, coefficients: &[(&str, f64)]) -> f64 {
        let mut weighted = 0.0;
        let mut total = 0.0;
        for (axis, coefficient) in coefficients {
            if let Some(weight) = vector.weight(axis) {
                weighted += coefficient * weight.value();
                total += coefficient.abs();
            }
        }
        if total == 0.0 {
            return 0.0;
        }
        (weighted / total).clamp(-1.0, 1.0)
    }

    /// Renders a one-line description from the one or two strongest axes.
    ///
    /// Ties on magnitude resolve by axis name, so equal inputs always give
    /// the same sentence.
    pub fn one_line_reading(
        profile_name: &str,
        axis_scores: &BTreeMap<PresentationAxis, f64>,
    ) -> String {
        let name = match profile_name.trim() {
            "" => "This profile",
            trimmed => trimmed,
        };

        let mut ranked: Vec<(PresentationAxis, f64)> = axis_scores
            .iter()
            .filter(|(_, score)| score.is_finite() && score.abs() >= READING_NOISE_FLOOR)
            .map(|(axis, score)| (*axis, *score))
            .collect();
        ranked.sort_by(|(a_axis, a), (b_axis, b)| {
            b.abs()
                .partial_cmp(&a.abs())
                .unwrap_or(Ordering::Equal)
                .then_with(|| a_axis.as_str().cmp(b_axis.as_str()))
        });

        match ranked.as_slice() {
            [] => format!("{}'s taste is still taking shape.", name),
            [(axis, score)] => format!("{} leans {}.", name, axis.pole(*score)),
            [(first, first_score), (second, second_score), ..] => format!(
                "{} leans {} with a {} streak.",
                name,
                first.pole(*first_score),
                second.pole(*second_score)
            ),
        }
    }
}
