//! Loop instrumentation.
//!
//! Telemetry is a read-only side channel. Nothing in perception, the
//! orchestrator, the observers or the learning path may read it back.

pub mod event;
pub mod metrics;
pub mod recorder;

pub use event::TelemetryEvent;
pub use metrics::TelemetrySnapshot;
pub use recorder::TelemetryRecorder;
