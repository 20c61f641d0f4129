//! Taste domains and their fixed axis taxonomies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Axes for interior spaces.
pub const SPACE_AXES: &[&str] = &[
    "bold_color",
    "cozy",
    "industrial",
    "minimalist",
    "natural_materials",
    "symmetry",
    "vintage",
    "warm",
];

/// Axes for physical objects (furniture, lighting, accessories).
pub const OBJECT_AXES: &[&str] = &[
    "bold_color",
    "craftsmanship",
    "luxury",
    "minimalist",
    "natural_materials",
    "playful",
    "utilitarian",
    "vintage",
];

/// Axes for artwork.
pub const ART_AXES: &[&str] = &[
    "abstract",
    "bold_color",
    "classical",
    "figurative",
    "minimalist",
    "monochrome",
    "surreal",
    "textured",
];

/// A taste domain. Each domain owns a fixed axis taxonomy that never grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TasteDomain {
    Space,
    Objects,
    Art,
}

impl TasteDomain {
    pub fn all() -> &'static [TasteDomain] {
        &[TasteDomain::Space, TasteDomain::Objects, TasteDomain::Art]
    }

    /// The axis names of this domain, sorted lexically.
    pub fn axes(&self) -> &'static [&'static str] {
        match self {
            TasteDomain::Space => SPACE_AXES,
            TasteDomain::Objects => OBJECT_AXES,
            TasteDomain::Art => ART_AXES,
        }
    }

    pub fn has_axis(&self, axis: &str) -> bool {
        self.axes().binary_search(&axis).is_ok()
    }

    pub fn axis_count(&self) -> usize {
        self.axes().len()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TasteDomain::Space => "space",
            TasteDomain::Objects => "objects",
            TasteDomain::Art => "art",
        }
    }
}

impl fmt::Display for TasteDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TasteDomain {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "space" => Ok(TasteDomain::Space),
            "objects" => Ok(TasteDomain::Objects),
            "art" => Ok(TasteDomain::Art),
            other => Err(ValidationError::invalid_format(
                "domain",
                format!("unknown taste domain '{}'", other),
            )),
        }
    }
}

/// Renders an axis name for humans: `natural_materials` -> `natural materials`.
pub fn humanize_axis(axis: &str) -> String {
    axis.replace('_', " ")
}
