//! Authentication and authorization subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound authorization header
//!     → gate.rs (state machine: missing / invalid / authenticated)
//!     → token.rs (HS256 signature + expiry + issuer verification)
//!     → Identity attached to context + request extensions
//!     → roles.rs (separate role gate over the closed Role enum)
//! ```
//!
//! # Design Decisions
//! - Verification is a pure function; middleware and the gateway both call it
//! - Authentication (401) and authorization (403) are distinct, composable
//!   checks with distinct failure codes
//! - Missing vs invalid credential stays distinguishable internally

pub mod gate;
pub mod password;
pub mod roles;
pub mod token;

pub use gate::{require_auth, verify_bearer, AuthError, Identity};
pub use roles::{Role, RoleSet};
pub use token::{Claims, TokenSigner, TokenVerifier};
