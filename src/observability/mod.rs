//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every listener produces:
//!     → logging.rs (structured log events, correlation ids as fields)
//!     → metrics.rs (request counters, latency histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON lines in production)
//!     → Prometheus scrape endpoint (optional, one per process)
//! ```
//!
//! # Design Decisions
//! - Request and trace ids come from the context store, not from here;
//!   this module only emits
//! - Metrics are cheap (atomic increments) and safe to record with no
//!   exporter installed

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::init_metrics;
