//! Domain layer containing the taste model and the services over it.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `taste` - Taste vectors, identities, decisions, catalog items, evaluations
//! - `scoring` - Pure services: evaluator, reinforcement updater, axis mapping

pub mod foundation;
pub mod scoring;
pub mod taste;
