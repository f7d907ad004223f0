//! Shared utilities for integration testing.

// Each test binary compiles this module separately and uses a different
// subset of it.
#![allow(dead_code)]

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use task_platform::{
    auth::{Role, RoleSet, TokenSigner},
    config::PlatformConfig,
    gateway::{self, GatewayState},
    services::{
        orders::{self, OrdersState},
        users::{self, UsersState},
    },
};

/// Secret shared by every server and minted token in the test suite.
pub const TEST_SECRET: &str = "integration-secret";

/// Serve `router` on an ephemeral port and return its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

/// Reserve an address nothing is listening on.
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    addr
}

fn base_config() -> PlatformConfig {
    PlatformConfig {
        jwt_secret: TEST_SECRET.to_string(),
        ..PlatformConfig::default()
    }
}

/// A running platform: gateway wired to live user and order services.
pub struct Platform {
    pub gateway_url: String,
    pub user_url: String,
    pub order_url: String,
    pub client: reqwest::Client,
}

/// Spawn the full platform on ephemeral ports.
pub async fn spawn_platform() -> Platform {
    let mut config = base_config();

    let user_url = spawn_server(users::router(UsersState::new(&config), &config)).await;
    let order_url = spawn_server(orders::router(OrdersState::new(&config), &config)).await;

    config.user_service_url = user_url.parse().expect("user url");
    config.order_service_url = order_url.parse().expect("order url");

    let gateway_url = spawn_server(gateway::router(GatewayState::new(&config), &config)).await;

    Platform {
        gateway_url,
        user_url,
        order_url,
        client: reqwest::Client::new(),
    }
}

/// Bare handler that reports the request it received as JSON and sets no
/// headers of its own.
async fn echo_received_request(request: axum::extract::Request) -> axum::Json<serde_json::Value> {
    let headers: serde_json::Map<String, serde_json::Value> = request
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                serde_json::Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
            )
        })
        .collect();

    axum::Json(serde_json::json!({
        "path": request.uri().path(),
        "query": request.uri().query(),
        "headers": headers,
    }))
}

/// Spawn a platform whose order upstream is a bare echo server, for
/// asserting exactly what crosses the gateway in each direction.
pub async fn spawn_platform_with_echo_orders() -> Platform {
    let mut config = base_config();

    let user_url = spawn_server(users::router(UsersState::new(&config), &config)).await;
    let order_url = spawn_server(Router::new().fallback(echo_received_request)).await;

    config.user_service_url = user_url.parse().expect("user url");
    config.order_service_url = order_url.parse().expect("order url");

    let gateway_url = spawn_server(gateway::router(GatewayState::new(&config), &config)).await;

    Platform {
        gateway_url,
        user_url,
        order_url,
        client: reqwest::Client::new(),
    }
}

/// Spawn a gateway whose order upstream points at a dead address; the user
/// service stays live.
pub async fn spawn_platform_with_dead_orders() -> Platform {
    let mut config = base_config();

    let user_url = spawn_server(users::router(UsersState::new(&config), &config)).await;
    let order_url = format!("http://{}", dead_address().await);

    config.user_service_url = user_url.parse().expect("user url");
    config.order_service_url = order_url.parse().expect("order url");

    let gateway_url = spawn_server(gateway::router(GatewayState::new(&config), &config)).await;

    Platform {
        gateway_url,
        user_url,
        order_url,
        client: reqwest::Client::new(),
    }
}

/// Mint a token the platform's verifiers accept, without going through
/// registration. The subject does not need to exist in the user store.
pub fn mint_token(user_id: &str, roles: &[Role]) -> String {
    TokenSigner::new(TEST_SECRET, 3600)
        .sign(
            user_id.to_string(),
            format!("{user_id}@example.com"),
            RoleSet::from_iter(roles.iter().copied()),
        )
        .expect("sign token")
}

/// Mint an already-expired token.
pub fn mint_expired_token(user_id: &str) -> String {
    TokenSigner::new(TEST_SECRET, -60)
        .sign(
            user_id.to_string(),
            format!("{user_id}@example.com"),
            RoleSet::from_iter([Role::Engineer]),
        )
        .expect("sign token")
}

impl Platform {
    pub fn gateway(&self, path: &str) -> String {
        format!("{}{path}", self.gateway_url)
    }

    /// Register a user through the gateway and assert success.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> serde_json::Value {
        let response = self
            .client
            .post(self.gateway("/v1/users/register"))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "name": name,
            }))
            .send()
            .await
            .expect("register request");
        assert_eq!(response.status(), 201, "registration should succeed");
        response.json().await.expect("register body")
    }

    /// Log a registered user in through the gateway and return the token.
    pub async fn login_token(&self, email: &str, password: &str) -> String {
        let response = self
            .client
            .post(self.gateway("/v1/users/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("login request");
        assert_eq!(response.status(), 200, "login should succeed");

        let body: serde_json::Value = response.json().await.expect("login body");
        body["data"]["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    /// Register then log in, returning (token, user id).
    pub async fn signed_up_user(&self, email: &str) -> (String, String) {
        let registered = self.register(email, "password123", "Test User").await;
        let user_id = registered["data"]["id"]
            .as_str()
            .expect("id in register response")
            .to_string();
        let token = self.login_token(email, "password123").await;
        (token, user_id)
    }

    /// Create an order through the gateway, returning its id.
    pub async fn create_order(&self, token: &str, items: serde_json::Value) -> String {
        let response = self
            .client
            .post(self.gateway("/v1/orders"))
            .bearer_auth(token)
            .json(&serde_json::json!({ "items": items }))
            .send()
            .await
            .expect("create order request");
        assert_eq!(response.status(), 201, "order creation should succeed");

        let body: serde_json::Value = response.json().await.expect("order body");
        body["data"]["id"]
            .as_str()
            .expect("id in order response")
            .to_string()
    }
}

/// Assert a response is the error envelope with the given code, returning
/// the parsed body for further checks.
pub async fn assert_error_envelope(
    response: reqwest::Response,
    status: u16,
    code: &str,
) -> serde_json::Value {
    assert_eq!(response.status(), status);
    let body: serde_json::Value = response.json().await.expect("error body");
    assert_eq!(body["success"], false, "error envelope success flag");
    assert_eq!(body["error"]["code"], code, "error envelope code");
    body
}
