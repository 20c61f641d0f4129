//! Catalog items as seen by the scoring core (read-only input).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::foundation::{CatalogItemId, UnitInterval, Weight};

use super::{normalize_tag, TasteDomain};

/// Axis weights and descriptive tags of an item.
///
/// Weights are clamped to [-1, 1]; axes may be sparse.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemAttributes {
    #[serde(default)]
    pub weights: BTreeMap<String, Weight>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ItemAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set one axis weight (clamped).
    pub fn with_weight(mut self, axis: impl Into<String>, value: f64) -> Self {
        self.weights.insert(axis.into(), Weight::new(value));
        self
    }

    /// Builder: add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn weight(&self, axis: &str) -> Option<Weight> {
        self.weights.get(axis).copied()
    }

    /// Tags after normalization, deduplicated and sorted.
    pub fn normalized_tags(&self) -> BTreeSet<String> {
        self.tags.iter().filter_map(|t| normalize_tag(t)).collect()
    }
}

/// Optional hints from the catalog about how likely an item is to be regretted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RiskMetadata {
    /// Baseline regret likelihood supplied by the catalog (returns, complaints).
    #[serde(default)]
    pub regret_prior: UnitInterval,
    /// Item follows a short-lived trend.
    #[serde(default)]
    pub trend_sensitive: bool,
}

/// A candidate object to score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: CatalogItemId,
    pub domain: TasteDomain,
    #[serde(default)]
    pub attributes: ItemAttributes,
    #[serde(default)]
    pub risk: Option<RiskMetadata>,
}

impl CatalogItem {
    pub fn new(id: CatalogItemId, domain: TasteDomain, attributes: ItemAttributes) -> Self {
        Self {
            id,
            domain,
            attributes,
            risk: None,
        }
    }

    pub fn with_risk(mut self, risk: RiskMetadata) -> Self {
        self.risk = Some(risk);
        self
    }
}
