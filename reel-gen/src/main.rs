//! reel-gen - Short video generation microservice
//!
//! Accepts a topic, runs script → voice → video → lip-sync → captions, and
//! streams progress to the client as Server-Sent Events.

use anyhow::{Context, Result};
use clap::Parser;
use reel_common::config::{default_config_path, load_toml_config};
use std::path::PathBuf;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reel_gen::config::GeneratorConfig;
use reel_gen::{build_router, AppState};

/// Command-line arguments for reel-gen
#[derive(Parser, Debug)]
#[command(name = "reel-gen")]
#[command(about = "Short video generation microservice")]
#[command(version)]
struct Args {
    /// TOML configuration file (default: <config_dir>/reelgen/reel-gen.toml)
    #[arg(short, long, env = "REELGEN_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "REELGEN_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "REELGEN_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(|| default_config_path("reel-gen"));
    let toml_config = match &config_path {
        Some(path) => load_toml_config(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Default::default(),
    };

    // RUST_LOG overrides the TOML level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("reel_gen={0},reel_common={0},tower_http=info", toml_config.logging.level)
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting reel-gen v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) if path.exists() => info!("Configuration file: {}", path.display()),
        Some(path) => info!("Configuration file {} not found, using defaults", path.display()),
        None => info!("No configuration directory, using defaults"),
    }

    let mut config = GeneratorConfig::resolve(&toml_config).context("Invalid configuration")?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    info!(
        "Video polling: {} attempts every {:?}",
        config.poll_policy.max_attempts, config.poll_policy.interval
    );

    let bind_address = config.bind_address();
    let state = AppState::new(config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_address))?;
    info!("Listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

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
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
