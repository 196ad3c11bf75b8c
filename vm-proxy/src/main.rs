//! vm-proxy - ValueMatrix prediction proxy
//!
//! Holds the gateway credential so browsers never see it.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info, warn};
use vm_common::config::{load_toml_config, resolve_gateway_api_key, resolve_root_folder};
use vm_proxy::{build_router, AppState, GatewayClient, GatewaySettings};

/// Command-line arguments for vm-proxy
#[derive(Parser, Debug)]
#[command(name = "vm-proxy")]
#[command(about = "House price prediction proxy for ValueMatrix")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root folder for ValueMatrix data
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Interface to bind
    #[arg(long, env = "VALUEMATRIX_PROXY_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "VALUEMATRIX_PROXY_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_toml_config(args.config.as_deref()).context("Failed to load config")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                config
                    .logging
                    .level
                    .parse::<tracing::Level>()
                    .unwrap_or(tracing::Level::INFO)
                    .into(),
            ),
        )
        .init();

    info!(
        "Starting ValueMatrix prediction proxy (vm-proxy) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    // The proxy keeps no files of its own; logged so both services report the same location
    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
    info!("Root folder: {}", root_folder.display());

    let api_key = resolve_gateway_api_key(&config);
    if api_key.is_none() {
        warn!("No gateway API key configured; every prediction will fail until one is set");
    }

    let settings = GatewaySettings::from_config(&config.gateway, api_key);
    info!(
        base_url = %settings.base_url,
        model = %settings.model,
        "Gateway configured"
    );

    let gateway = GatewayClient::new(settings).context("Failed to build gateway client")?;
    let app = build_router(AppState::new(gateway));

    let host = args.host.unwrap_or(config.proxy.host);
    let port = args.port.unwrap_or(config.proxy.port);
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("vm-proxy listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
