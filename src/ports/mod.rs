//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `IdentityPersistence` - Versioned identity snapshots with compare-and-swap saves
//! - `DecisionEventSource` - Append-only decision history per profile
//!
//! ## Catalog Ports
//!
//! - `CatalogProvider` - Read-only candidate items by domain
//!
//! ## Telemetry Ports
//!
//! - `TelemetrySink` - Best-effort delivery target fed by the telemetry worker

mod catalog_provider;
mod decision_event_source;
mod identity_persistence;
mod telemetry_sink;

pub use catalog_provider::CatalogProvider;
pub use decision_event_source::DecisionEventSource;
pub use identity_persistence::{check_successor, IdentityPersistence};
pub use telemetry_sink::TelemetrySink;
