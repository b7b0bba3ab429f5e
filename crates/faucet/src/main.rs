//! Faucet service binary

use clap::Parser;
use liquid_common::init_logging;
use liquid_faucet::api::router;
use liquid_faucet::{FaucetConfig, FaucetService};
use liquid_rpc::{RoutingPolicy, RpcClient};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Faucet service CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server address
    #[arg(long)]
    server_addr: Option<String>,

    /// Node host
    #[arg(long)]
    node_host: Option<String>,

    /// Node RPC port
    #[arg(long)]
    node_port: Option<u16>,

    /// Node wallet name
    #[arg(long)]
    wallet: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = FaucetConfig::load(args.config.as_deref())?;

    // Override with CLI arguments
    if let Some(addr) = args.server_addr {
        config.server_addr = addr;
    }

    if let Some(host) = args.node_host {
        config.node.host = host;
    }

    if let Some(port) = args.node_port {
        config.node.port = port;
    }

    if let Some(wallet) = args.wallet {
        config.node.wallet = wallet;
    }

    if args.debug {
        config.logging.level = "debug".to_string();
    }

    init_logging(&config.logging).map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting Liquid Faucet v{}", env!("CARGO_PKG_VERSION"));

    let rpc = RpcClient::new(config.node.endpoint()?, config.rpc.clone())?;

    info!("Configuration:");
    info!("  Server address: {}", config.server_addr);
    info!("  Node endpoint: {}", rpc.endpoint());
    if let RoutingPolicy::Socks5 { proxy } = rpc.routing() {
        info!("  Node proxy: {}", proxy);
    }
    info!(
        "  RPC retry: {} attempts, {}ms apart",
        config.rpc.retry_attempts, config.rpc.retry_interval_ms
    );
    info!("  Faucet amounts: {} LBTC, {} TEST", config.lbtc_amount, config.test_amount);

    let service = Arc::new(FaucetService::new(config.clone(), Arc::new(rpc)));

    if let Err(e) = service.unlock_wallet().await {
        warn!("Wallet unlock failed: {}", e);
        return Err(e.into());
    }

    let mut app = router(service.clone()).layer(TraceLayer::new_for_http());

    // Add CORS if enabled
    if config.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        app = app.layer(cors);
        info!("CORS enabled");
    }

    // Start server
    let addr: SocketAddr = config.server_addr.parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down gracefully");
    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
