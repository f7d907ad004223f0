//! Gateway route table.
//!
//! # Responsibilities
//! - Match inbound paths against prefix rules
//! - Decide per (method, path) whether the auth gate applies
//! - Rewrite the path for the upstream hop
//!
//! # Design Decisions
//! - Rules are compiled at startup and immutable at runtime
//! - Most specific prefix wins; ties are impossible because prefixes are
//!   unique
//! - Prefixes match whole path segments, so `/v1/users` does not capture
//!   `/v1/username-service`
//! - Exemptions are exact (method, path) pairs; any other method on the
//!   same sub-path falls through to the auth gate

use axum::http::Method;
use url::Url;

use crate::config::PlatformConfig;

/// One forwarding rule.
#[derive(Debug, Clone)]
pub struct RouteRule {
    /// Identifier for logs and metrics.
    pub name: &'static str,
    /// Inbound path prefix this rule captures.
    pub path_prefix: String,
    /// Upstream base URL requests are relayed to.
    pub upstream: Url,
    /// Whether the auth gate guards this rule at all.
    pub auth_required: bool,
    /// Exact (method, inbound path) pairs that skip the auth gate.
    pub exempt: Vec<(Method, String)>,
    /// Strip the matched prefix before forwarding.
    pub strip_prefix: bool,
}

impl RouteRule {
    /// Whether `path` falls under this rule's prefix, on a segment boundary.
    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.path_prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Whether this exact (method, path) skips the auth gate.
    pub fn is_exempt(&self, method: &Method, path: &str) -> bool {
        self.exempt
            .iter()
            .any(|(m, p)| m == method && p == path)
    }

    /// The path the upstream sees, query string preserved.
    pub fn rewrite(&self, path: &str, query: Option<&str>) -> String {
        let rewritten = if self.strip_prefix {
            let rest = path.strip_prefix(self.path_prefix.as_str()).unwrap_or(path);
            if rest.is_empty() {
                "/"
            } else {
                rest
            }
        } else {
            path
        };

        match query {
            Some(query) => format!("{rewritten}?{query}"),
            None => rewritten.to_string(),
        }
    }
}

/// All rules, ordered most specific prefix first.
#[derive(Debug)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    pub fn new(mut rules: Vec<RouteRule>) -> Self {
        rules.sort_by(|a, b| b.path_prefix.len().cmp(&a.path_prefix.len()));
        Self { rules }
    }

    /// The most specific rule capturing `path`, if any.
    pub fn matching(&self, path: &str) -> Option<&RouteRule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }

    /// The reference route table: users behind `/v1/users` with exempt
    /// register/login, orders behind `/v1/orders` gated unconditionally.
    pub fn default_routes(config: &PlatformConfig) -> Self {
        Self::new(vec![
            RouteRule {
                name: "users",
                path_prefix: "/v1/users".to_string(),
                upstream: config.user_service_url.clone(),
                auth_required: true,
                exempt: vec![
                    (Method::POST, "/v1/users/register".to_string()),
                    (Method::POST, "/v1/users/login".to_string()),
                ],
                strip_prefix: true,
            },
            RouteRule {
                name: "orders",
                path_prefix: "/v1/orders".to_string(),
                upstream: config.order_service_url.clone(),
                auth_required: true,
                exempt: vec![],
                strip_prefix: true,
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::default_routes(&PlatformConfig::default())
    }

    #[test]
    fn longest_prefix_wins() {
        let config = PlatformConfig::default();
        let table = RouteTable::new(vec![
            RouteRule {
                name: "broad",
                path_prefix: "/v1".to_string(),
                upstream: config.user_service_url.clone(),
                auth_required: false,
                exempt: vec![],
                strip_prefix: true,
            },
            RouteRule {
                name: "narrow",
                path_prefix: "/v1/orders".to_string(),
                upstream: config.order_service_url.clone(),
                auth_required: true,
                exempt: vec![],
                strip_prefix: true,
            },
        ]);

        assert_eq!(table.matching("/v1/orders/abc").map(|r| r.name), Some("narrow"));
        assert_eq!(table.matching("/v1/users/me").map(|r| r.name), Some("broad"));
    }

    #[test]
    fn prefixes_respect_segment_boundaries() {
        let table = table();
        assert!(table.matching("/v1/users").is_some());
        assert!(table.matching("/v1/users/me").is_some());
        assert!(table.matching("/v1/username-service").is_none());
        assert!(table.matching("/v2/users").is_none());
    }

    #[test]
    fn exemptions_are_exact_method_and_path() {
        let table = table();
        let users = table.matching("/v1/users/register").expect("rule");

        assert!(users.is_exempt(&Method::POST, "/v1/users/register"));
        assert!(users.is_exempt(&Method::POST, "/v1/users/login"));
        assert!(!users.is_exempt(&Method::GET, "/v1/users/register"));
        assert!(!users.is_exempt(&Method::POST, "/v1/users/me"));
    }

    #[test]
    fn rewrite_strips_the_prefix_and_keeps_the_query() {
        let table = table();
        let users = table.matching("/v1/users/me").expect("rule");

        assert_eq!(users.rewrite("/v1/users/me", None), "/me");
        assert_eq!(users.rewrite("/v1/users", None), "/");
        assert_eq!(
            users.rewrite("/v1/users", Some("page=2&pageSize=5")),
            "/?page=2&pageSize=5"
        );
    }
}
