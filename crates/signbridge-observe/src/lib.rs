//! Observability setup for signbridge: structured logging and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
