//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod taste;

pub use taste::{
    EvaluateCatalogError, EvaluateCatalogHandler, EvaluateCatalogQuery, EvaluateCatalogResult,
    GetTasteReadingError, GetTasteReadingHandler, GetTasteReadingQuery, RecordDecisionCommand,
    RecordDecisionError, RecordDecisionHandler, RecordDecisionResult, ReplayHistoryCommand,
    ReplayHistoryError, ReplayHistoryHandler, TasteReading,
};
