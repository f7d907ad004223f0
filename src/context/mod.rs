//! Request-scoped correlation context.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → middleware.rs (read or mint x-request-id, begin context)
//!     → store.rs (bind context to the request's continuation chain)
//!     → any code on that chain may call RequestContext::current()
//!     → response echoes x-request-id
//! ```
//!
//! # Design Decisions
//! - Context rides a tokio task-local, so it follows the request's own
//!   suspend/resume chain; interleaved requests on a shared worker never
//!   observe each other's context.
//! - The handle is a cheap clone (Arc); mutation goes through typed setters
//!   rather than a free-form merge.

pub mod middleware;
pub mod store;

pub use middleware::{request_context_middleware, X_REQUEST_ID};
pub use store::{ContextData, RequestContext};
