//! Telemetry adapters: the bounded queue, its worker and the sinks.

mod in_memory;
mod queue;
mod tracing_sink;
mod worker;

pub use in_memory::InMemoryTelemetrySink;
pub use queue::TelemetryQueue;
pub use tracing_sink::TracingTelemetrySink;
pub use worker::{DeliveryStats, TelemetryWorker};
