//! Task platform: API gateway plus user and order services.

pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod gateway;
pub mod http;
pub mod observability;
pub mod pagination;
pub mod services;
pub mod trace;

pub use config::PlatformConfig;
pub use context::RequestContext;
pub use error::{AppError, AppResult};
