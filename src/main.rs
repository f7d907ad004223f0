//! Task platform launcher.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                 API GATEWAY :3000            │
//!     Client Request   │  ┌─────────┐   ┌──────────┐   ┌──────────┐  │
//!     ─────────────────┼─▶│ context │──▶│auth gate │──▶│  relay   │  │
//!                      │  │ + trace │   │(per rule)│   │(rewrite) │  │
//!                      │  └─────────┘   └──────────┘   └────┬─────┘  │
//!                      └───────────────────────────────────│─────────┘
//!                                     ┌────────────────────┴───────┐
//!                                     ▼                            ▼
//!                      ┌──────────────────────┐      ┌──────────────────────┐
//!                      │  USER SERVICE :3001  │      │ ORDER SERVICE :3002  │
//!                      │  register / login    │      │  create / list /     │
//!                      │  me / list (admin)   │      │  status / cancel     │
//!                      └──────────────────────┘      └──────────────────────┘
//! ```
//!
//! Every listener shares one layer stack: request context, trace
//! correlation, metrics, timeout, body limit, CORS. Correlation ids travel
//! on `x-request-id` / `x-trace-id`; each hop relabels its span id as
//! `x-parent-span-id` for the next.

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use task_platform::{
    config::PlatformConfig,
    gateway::{self, GatewayState},
    observability,
    services::{
        orders::{self, OrdersState},
        users::{self, UsersState},
    },
};

#[derive(Parser)]
#[command(name = "task-platform")]
#[command(about = "API gateway and task services", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API gateway
    Gateway,
    /// Run the user service
    Users,
    /// Run the order service
    Orders,
    /// Run the gateway and both services in one process
    All,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = PlatformConfig::from_env()?;
    observability::init_logging(&config);

    tracing::info!(
        env = %config.env,
        gateway_port = config.gateway_port,
        user_service_port = config.user_service_port,
        order_service_port = config.order_service_port,
        "configuration loaded"
    );

    if config.metrics_enabled {
        observability::init_metrics(config.metrics_address);
    }

    match cli.command.unwrap_or(Commands::All) {
        Commands::Gateway => {
            let router = gateway::router(GatewayState::new(&config), &config);
            serve("api-gateway", config.gateway_port, router).await?;
        }
        Commands::Users => {
            let router = users::router(UsersState::new(&config), &config);
            serve("service-users", config.user_service_port, router).await?;
        }
        Commands::Orders => {
            let router = orders::router(OrdersState::new(&config), &config);
            serve("service-orders", config.order_service_port, router).await?;
        }
        Commands::All => {
            let gateway = gateway::router(GatewayState::new(&config), &config);
            let users = users::router(UsersState::new(&config), &config);
            let orders = orders::router(OrdersState::new(&config), &config);

            tokio::try_join!(
                serve("api-gateway", config.gateway_port, gateway),
                serve("service-users", config.user_service_port, users),
                serve("service-orders", config.order_service_port, orders),
            )?;
        }
    }

    tracing::info!("shutdown complete");
    Ok(())
}

async fn serve(service: &str, port: u16, router: axum::Router) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(service, address = %listener.local_addr()?, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
}
