//! Taste module - the preference model and its inputs/outputs.
//!
//! # Domain Invariants
//!
//! 1. Axis weights are always within [-1, 1]
//! 2. A vector's axes are fixed by its domain taxonomy and never grow
//! 3. Tag sets are deduplicated and capped, evicting the oldest entry
//! 4. Identity version starts at 1 and increases by exactly 1 per update
//! 5. Identities are replaced, never mutated in place

mod catalog;
mod decision;
mod evaluation;
mod events;
mod identity;
mod tags;
mod taxonomy;
mod vector;

pub use catalog::{CatalogItem, ItemAttributes, RiskMetadata};
pub use decision::{sort_chronologically, DecisionAction, DecisionEvent};
pub use evaluation::TasteEvaluatedObject;
pub use events::TelemetryEvent;
pub use identity::{IdentityVersion, TasteIdentity, INITIAL_STABILITY};
pub use tags::{normalize_tag, TagSet, DEFAULT_MAX_TAGS};
pub use taxonomy::{humanize_axis, TasteDomain, ART_AXES, OBJECT_AXES, SPACE_AXES};
pub use vector::TasteVector;
