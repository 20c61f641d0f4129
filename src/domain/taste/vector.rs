//! TasteVector: bounded axis weights plus avoid/influence tag sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::Weight;

use super::{TagSet, TasteDomain, DEFAULT_MAX_TAGS};

/// Axis weights over a domain's fixed taxonomy.
///
/// Invariants:
/// - every taxonomy axis has exactly one weight, clamped to [-1, 1]
/// - axes outside the taxonomy are never stored
/// - tag sets are deduplicated and capped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TasteVectorRecord", into = "TasteVectorRecord")]
pub struct TasteVector {
    domain: TasteDomain,
    weights: BTreeMap<String, Weight>,
    avoids: TagSet,
    influences: TagSet,
}

#[derive(Serialize, Deserialize)]
struct TasteVectorRecord {
    domain: TasteDomain,
    #[serde(default)]
    weights: BTreeMap<String, Weight>,
    #[serde(default)]
    avoids: TagSet,
    #[serde(default)]
    influences: TagSet,
}

impl From<TasteVectorRecord> for TasteVector {
    fn from(record: TasteVectorRecord) -> Self {
        let mut vector = TasteVector::zero(record.domain);
        for (axis, weight) in record.weights {
            vector.set_weight(&axis, weight.value());
        }
        vector.avoids = record.avoids;
        vector.influences = record.influences;
        vector
    }
}

impl From<TasteVector> for TasteVectorRecord {
    fn from(vector: TasteVector) -> Self {
        TasteVectorRecord {
            domain: vector.domain,
            weights: vector.weights,
            avoids: vector.avoids,
            influences: vector.influences,
        }
    }
}

impl TasteVector {
    /// All-zero vector with default tag capacity.
    pub fn zero(domain: TasteDomain) -> Self {
        Self::with_tag_capacity(domain, DEFAULT_MAX_TAGS)
    }

    /// All-zero vector with the given tag capacity.
    pub fn with_tag_capacity(domain: TasteDomain, max_tags: usize) -> Self {
        let weights = domain
            .axes()
            .iter()
            .map(|axis| (axis.to_string(), Weight::ZERO))
            .collect();

        Self {
            domain,
            weights,
            avoids: TagSet::new(max_tags),
            influences: TagSet::new(max_tags),
        }
    }

    /// Builder: set one axis (clamped). Unknown axes are ignored.
    pub fn with_weight(mut self, axis: &str, value: f64) -> Self {
        self.set_weight(axis, value);
        self
    }

    /// Builder: add an avoided tag.
    pub fn with_avoid(mut self, tag: &str) -> Self {
        self.avoids.insert(tag);
        self
    }

    /// Builder: add an influence tag.
    pub fn with_influence(mut self, tag: &str) -> Self {
        self.influences.insert(tag);
        self
    }

    pub fn domain(&self) -> TasteDomain {
        self.domain
    }

    pub fn weight(&self, axis: &str) -> Option<Weight> {
        self.weights.get(axis).copied()
    }

    /// Weights keyed by axis, in lexical axis order.
    pub fn weights(&self) -> &BTreeMap<String, Weight> {
        &self.weights
    }

    /// Sets an axis weight, clamping it to [-1, 1].
    ///
    /// Returns false (and changes nothing) if the axis is not part of the
    /// domain taxonomy.
    pub fn set_weight(&mut self, axis: &str, value: f64) -> bool {
        match self.weights.get_mut(axis) {
            Some(slot) => {
                *slot = Weight::new(value);
                true
            }
            None => false,
        }
    }

    pub fn avoids(&self) -> &TagSet {
        &self.avoids
    }

    pub fn influences(&self) -> &TagSet {
        &self.influences
    }

    pub fn avoids_mut(&mut self) -> &mut TagSet {
        &mut self.avoids
    }

    pub fn influences_mut(&mut self) -> &mut TagSet {
        &mut self.influences
    }

    /// Euclidean norm of the weights.
    pub fn norm(&self) -> f64 {
        self.weights
            .values()
            .map(|w| w.value() * w.value())
            .sum::<f64>()
            .sqrt()
    }

    /// Euclidean distance between the weights of two vectors.
    ///
    /// Axes missing on one side count as zero there.
    pub fn distance(&self, other: &TasteVector) -> f64 {
        let mut sum = 0.0;
        for (axis, w) in &self.weights {
            let o = other.weights.get(axis).map(Weight::value).unwrap_or(0.0);
            sum += (w.value() - o).powi(2);
        }
        for (axis, o) in &other.weights {
            if !self.weights.contains_key(axis) {
                sum += o.value().powi(2);
            }
        }
        sum.sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.weights.values().all(|w| w.value() == 0.0)
    }
}
