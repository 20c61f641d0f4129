//! Taste command and query handlers.

// Command handlers
mod record_decision;
mod replay_history;

// Query handlers
mod evaluate_catalog;
mod get_taste_reading;

pub use evaluate_catalog::{
    EvaluateCatalogError, EvaluateCatalogHandler, EvaluateCatalogQuery, EvaluateCatalogResult,
};
pub use get_taste_reading::{
    GetTasteReadingError, GetTasteReadingHandler, GetTasteReadingQuery, TasteReading,
};
pub use record_decision::{
    RecordDecisionCommand, RecordDecisionError, RecordDecisionHandler, RecordDecisionResult,
};
pub use replay_history::{ReplayHistoryCommand, ReplayHistoryError, ReplayHistoryHandler};
