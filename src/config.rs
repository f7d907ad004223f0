//! Platform configuration.
//!
//! One [`PlatformConfig`] value is assembled from the process environment at
//! startup and passed explicitly to every component that needs it. Nothing in
//! the crate reads the environment after this point.

use std::net::SocketAddr;

use url::Url;

/// Error raised while assembling configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {key} must be a number: {value}")]
    InvalidNumber { key: &'static str, value: String },

    #[error("environment variable {key} must be a URL: {source}")]
    InvalidUrl {
        key: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("environment variable {key} must be a socket address: {value}")]
    InvalidAddress { key: &'static str, value: String },
}

/// Root configuration shared by the gateway and both services.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Deployment environment name ("development", "production", ...).
    pub env: String,

    /// Log level filter applied when `RUST_LOG` is unset.
    pub log_level: String,

    /// HMAC secret for signing and verifying bearer tokens.
    pub jwt_secret: String,

    /// Token lifetime in seconds.
    pub jwt_ttl_secs: i64,

    /// Listen port for the API gateway.
    pub gateway_port: u16,

    /// Listen port for the user service.
    pub user_service_port: u16,

    /// Listen port for the order service.
    pub order_service_port: u16,

    /// Upstream target the gateway forwards `/v1/users` traffic to.
    pub user_service_url: Url,

    /// Upstream target the gateway forwards `/v1/orders` traffic to.
    pub order_service_url: Url,

    /// Total request timeout in seconds (backstop layer on every listener).
    pub request_timeout_secs: u64,

    /// Per-hop timeout for gateway → upstream calls, in seconds.
    pub upstream_timeout_secs: u64,

    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,

    /// Expose a Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Bind address for the metrics endpoint.
    pub metrics_address: SocketAddr,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            env: "development".to_string(),
            log_level: "debug".to_string(),
            jwt_secret: "dev-secret".to_string(),
            jwt_ttl_secs: 3600,
            gateway_port: 3000,
            user_service_port: 3001,
            order_service_port: 3002,
            user_service_url: Url::parse("http://127.0.0.1:3001").expect("static URL"),
            order_service_url: Url::parse("http://127.0.0.1:3002").expect("static URL"),
            request_timeout_secs: 30,
            upstream_timeout_secs: 10,
            max_body_bytes: 2 * 1024 * 1024,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".parse().expect("static address"),
        }
    }
}

impl PlatformConfig {
    /// Assemble configuration from the process environment, falling back to
    /// the defaults above for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            env: env_or("APP_ENV", &defaults.env),
            log_level: env_or("LOG_LEVEL", &defaults.log_level),
            jwt_secret: env_or("JWT_SECRET", &defaults.jwt_secret),
            jwt_ttl_secs: env_number("JWT_TTL_SECS", defaults.jwt_ttl_secs)?,
            gateway_port: env_number("API_GATEWAY_PORT", defaults.gateway_port)?,
            user_service_port: env_number("USER_SERVICE_PORT", defaults.user_service_port)?,
            order_service_port: env_number("ORDER_SERVICE_PORT", defaults.order_service_port)?,
            user_service_url: env_url("USER_SERVICE_URL", &defaults.user_service_url)?,
            order_service_url: env_url("ORDER_SERVICE_URL", &defaults.order_service_url)?,
            request_timeout_secs: env_number("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
            upstream_timeout_secs: env_number("UPSTREAM_TIMEOUT_SECS", defaults.upstream_timeout_secs)?,
            max_body_bytes: env_number("MAX_BODY_BYTES", defaults.max_body_bytes)?,
            metrics_enabled: env_or("METRICS_ENABLED", "false") == "true",
            metrics_address: env_addr("METRICS_ADDRESS", defaults.metrics_address)?,
        })
    }

    /// True when running with the production log/output profile.
    pub fn is_production(&self) -> bool {
        self.env == "production"
    }
}

fn env_or(key: &'static str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.to_string())
}

fn env_number<T: std::str::FromStr>(key: &'static str, fallback: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
        Err(_) => Ok(fallback),
    }
}

fn env_url(key: &'static str, fallback: &Url) -> Result<Url, ConfigError> {
    match std::env::var(key) {
        Ok(value) => Url::parse(&value).map_err(|source| ConfigError::InvalidUrl { key, source }),
        Err(_) => Ok(fallback.clone()),
    }
}

fn env_addr(key: &'static str, fallback: SocketAddr) -> Result<SocketAddr, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidAddress { key, value }),
        Err(_) => Ok(fallback),
    }
}
