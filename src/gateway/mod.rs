//! API gateway.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → platform layers (context, trace, metrics, limits)
//!     → server.rs (route table lookup)
//!     → auth gate (unless the (method, path) is exempt)
//!     → rules.rs (prefix strip rewrite)
//!     → proxy.rs (whitelisted headers, forward, echo trace)
//!     → client response
//! ```
//!
//! # Design Decisions
//! - The route table is compiled once at startup and shared read-only
//! - Gate failures answer locally; the upstream is never contacted
//! - Outbound headers are an explicit whitelist, never a passthrough
//! - Upstream connectivity failures map to `bad_gateway`, distinct from
//!   application errors which relay unchanged

pub mod proxy;
pub mod rules;
pub mod server;

pub use rules::{RouteRule, RouteTable};
pub use server::{router, GatewayState};
