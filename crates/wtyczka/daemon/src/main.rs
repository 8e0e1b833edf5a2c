//! Wtyczka Daemon - Registration and time-gated access API
//!
//! The daemon provides:
//! - Check-access endpoints for the contact and payment dates
//! - Admin shared-secret verification
//! - Registration, payment upload and contacts endpoints behind the gate middleware

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wtyczka_daemon::error::{DaemonError, DaemonResult};
use wtyczka_daemon::{DaemonConfig, Server};

/// Wtyczka Daemon CLI
#[derive(Parser)]
#[command(name = "wtyczkad")]
#[command(about = "Wtyczka 2025 - Registration and time-gated access API", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "WTYCZKA_CONFIG")]
    config: Option<String>,

    /// Listen address
    #[arg(short, long, env = "WTYCZKA_LISTEN_ADDR")]
    listen: Option<String>,

    /// Log level
    #[arg(long, env = "WTYCZKA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "WTYCZKA_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = DaemonConfig::load(cli.config.as_deref())
        .map_err(|e| DaemonError::Config(e.to_string()))?;

    // Override with CLI args
    if let Some(listen) = &cli.listen {
        config.server.listen_addr = listen
            .parse()
            .map_err(|e| DaemonError::Config(format!("Invalid listen address: {}", e)))?;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json;

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %config.server.listen_addr,
        "Starting Wtyczka daemon"
    );

    // Create and run server
    let server = Server::new(config).await?;
    server.run().await
}
