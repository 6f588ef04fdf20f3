//! Observability setup for newsbot: structured logging and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
