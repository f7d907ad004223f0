//! Trace correlation subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound headers
//!     → correlator.rs (inherit x-trace-id or mint; span is always fresh)
//!     → context (stamped once per hop)
//!     → response headers (x-trace-id echoed, x-span-id = this hop's span)
//!
//! Outbound hop:
//!     x-request-id, x-trace-id copied unchanged
//!     current span relabeled as x-parent-span-id
//! ```
//!
//! # Design Decisions
//! - UUID v4 identifiers: collision probability negligible by construction
//! - The trace id is write-once; suspension and resumption never change it
//! - Each hop reports its own span id, never a downstream one

pub mod correlator;
pub mod middleware;

pub use correlator::{
    inbound_trace_id, mint_id, propagation_headers, X_PARENT_SPAN_ID, X_SPAN_ID, X_TRACE_ID,
};
pub use middleware::trace_correlation_middleware;
