//! Taste Identity - an evolving model of a person's aesthetic preferences.
//!
//! Each profile owns a versioned taste vector over a per-domain axis
//! taxonomy. Catalog items are scored against it by a deterministic
//! evaluator, and every purchase or reaction is folded back in by the
//! reinforcement updater.
//!
//! The crate follows a ports-and-adapters layout: pure scoring lives in
//! [`domain`], I/O boundaries are traits in [`ports`], and the
//! [`application::IdentityCoordinator`] serializes updates per profile while
//! evaluations read published snapshots.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
