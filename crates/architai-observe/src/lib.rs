//! Observability setup for the ArchitAI client: structured logging with an
//! optional OpenTelemetry span export.

pub mod tracing_setup;
