//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, bounded numbers and error types
//! that form the vocabulary of the taste identity domain.

mod bounded;
mod command;
mod errors;
mod ids;
mod timestamp;

pub use bounded::{clamp_finite, AlignmentScore, UnitInterval, Weight};
pub use command::CommandMetadata;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{CatalogItemId, DecisionEventId, EvaluationId, ProfileId, TasteIdentityId};
pub use timestamp::Timestamp;
