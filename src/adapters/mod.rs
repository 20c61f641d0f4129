//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `persistence` - Identity stores (in-memory, filesystem)
//! - `catalog` - Static catalog loaded from code or a JSON/YAML file
//! - `decisions` - Append-only decision log
//! - `telemetry` - Bounded queue, background worker and sinks

pub mod catalog;
pub mod decisions;
pub mod persistence;
pub mod telemetry;

pub use catalog::StaticCatalog;
pub use decisions::InMemoryDecisionLog;
pub use persistence::{FsIdentityStore, InMemoryIdentityStore};
pub use telemetry::{
    DeliveryStats, InMemoryTelemetrySink, TelemetryQueue, TelemetryWorker, TracingTelemetrySink,
};
