//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! The `IdentityCoordinator` is the single writer of identity state; the
//! handlers wrap it for callers at the application boundary.

pub mod handlers;
mod identity_coordinator;

pub use handlers::{
    EvaluateCatalogHandler, EvaluateCatalogQuery, GetTasteReadingHandler, GetTasteReadingQuery,
    RecordDecisionCommand, RecordDecisionHandler, ReplayHistoryCommand, ReplayHistoryHandler,
    TasteReading,
};
pub use identity_coordinator::{
    CoordinatorSettings, Durability, IdentityCoordinator, RecordOutcome, ReplayOutcome,
};
