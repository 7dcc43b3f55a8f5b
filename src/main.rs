//! Leaderboard service - Main Entry Point
//!
//! Loads configuration, starts the refresh loop and serves the read API
//! until Ctrl-C.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

use leaderboard_service::api::create_router;
use leaderboard_service::config::{config_file_exists, load_config};
use leaderboard_service::LeaderboardService;

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", env = "LEADERBOARD_CONFIG")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(Some(&args.config))
        .with_context(|| format!("loading configuration from {}", args.config))?;
    config.logging.init(args.log_level.as_deref())?;

    info!("Starting leaderboard service");
    if config_file_exists(&args.config) {
        info!("Configuration file: {}", args.config);
    } else {
        warn!("Configuration file {} not found, using environment only", args.config);
    }

    let service = match LeaderboardService::from_config(&config) {
        Ok(service) => Arc::new(service),
        Err(e) if e.is_fatal() => {
            error!("Invalid leaderboard configuration: {}", e);
            return Err(e.into());
        }
        Err(e) => {
            error!("Failed to initialise leaderboard service: {}", e);
            return Err(e.into());
        }
    };
    let restored = service.restore_snapshots().await;
    if restored > 0 {
        info!("Restored {} persisted snapshot(s)", restored);
    }
    service.start().await?;

    let listener = tokio::net::TcpListener::bind(&config.server.listen)
        .await
        .with_context(|| format!("binding {}", config.server.listen))?;
    info!("Listening on {}", config.server.listen);

    let served = axum::serve(listener, create_router(Arc::clone(&service)))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    info!("Received shutdown signal, cleaning up...");
    service.stop().await;

    if let Err(e) = served {
        error!("HTTP server error: {}", e);
        return Err(e.into());
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
