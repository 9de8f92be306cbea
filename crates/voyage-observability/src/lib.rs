//! Observability for the voyage render pipeline.
//!
//! This crate provides:
//! - `init_logging` - one-time `tracing` subscriber setup (JSON or human)
//! - `TraceContext` / `request_span` - request-scoped span fields
//! - `RequestMetrics` - per-request timing and outcome record

mod logging;
mod metrics;
mod span;

pub use logging::*;
pub use metrics::*;
pub use span::*;

// Re-export RequestId and TimingContext from voyage-core for convenience
pub use voyage_core::{RequestId, TimingContext};
