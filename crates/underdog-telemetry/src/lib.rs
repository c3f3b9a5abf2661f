//! Prometheus metrics and structured logging for the underdog bot.
//!
//! - Structured logging with tracing (JSON in production)
//! - Prometheus counters for API usage, goals, signals and orders
//! - Periodic performance summary output

pub mod error;
pub mod logging;
pub mod metrics;
pub mod stats_reporter;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
pub use stats_reporter::{CounterSummary, StatsReporter};
