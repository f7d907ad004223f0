//! Route implementations for the two domain services.

pub mod orders;
pub mod users;
