//! vm-app - ValueMatrix web application
//!
//! Pages, accounts and prediction history. Predictions are forwarded to
//! vm-proxy.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use vm_common::config::{load_toml_config, resolve_root_folder, RootFolder};
use vm_common::db::{self, sessions};
use vm_app::{build_router, AppState, ProxyClient};

/// How often expired sessions are swept from the database
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Command-line arguments for vm-app
#[derive(Parser, Debug)]
#[command(name = "vm-app")]
#[command(about = "ValueMatrix house price prediction web application")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root folder holding the database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Interface to bind
    #[arg(long, env = "VALUEMATRIX_APP_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "VALUEMATRIX_APP_PORT")]
    port: Option<u16>,

    /// Base URL of vm-proxy
    #[arg(long, env = "VALUEMATRIX_PROXY_URL")]
    proxy_url: Option<String>,
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
        "Starting ValueMatrix web application (vm-app) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = RootFolder::new(resolve_root_folder(args.root_folder.as_deref(), &config));
    root_folder.ensure_exists()?;

    let db_path = root_folder.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match db::init_database_pool(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    match sessions::purge_expired_sessions(&pool).await {
        Ok(0) => {}
        Ok(n) => info!("Removed {} expired sessions", n),
        Err(e) => warn!("Failed to purge expired sessions: {}", e),
    }

    let purge_pool = pool.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) = sessions::purge_expired_sessions(&purge_pool).await {
                warn!("Failed to purge expired sessions: {}", e);
            }
        }
    });

    let proxy_url = args
        .proxy_url
        .or_else(|| config.app.proxy_url.clone())
        .unwrap_or_else(|| config.proxy.base_url());
    info!("Prediction proxy: {}", proxy_url);

    // No timeout unless the gateway call itself is bounded
    let proxy_timeout = config.gateway.timeout_secs.map(Duration::from_secs);
    let proxy = ProxyClient::new(&proxy_url, proxy_timeout).context("Failed to build proxy client")?;
    let session_ttl = chrono::Duration::seconds(config.app.session_ttl_secs as i64);
    let app = build_router(AppState::new(pool, proxy, session_ttl));

    let host = args.host.unwrap_or(config.app.host);
    let port = args.port.unwrap_or(config.app.port);
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("vm-app listening on http://{}", addr);
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
