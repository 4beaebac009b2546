//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher and backends produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms via the metrics facade)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape), only when enabled
//! ```
//!
//! # Design Decisions
//! - Request ID flows through logs and upstream headers
//! - Metric calls are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
