//! Retrying failover reverse proxy binary.
//!
//! Loads a TOML configuration, initializes logging and metrics, binds the
//! listener, and serves the retry middleware as the sole handler.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use retry_proxy::config::loader::load_config;
use retry_proxy::lifecycle::{signals, Shutdown};
use retry_proxy::observability::{logging, metrics};
use retry_proxy::HttpServer;

#[derive(Debug, Parser)]
#[command(name = "retry-proxy", version, about = "Retrying failover reverse proxy")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    logging::init(&config.observability);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream_hosts = config.upstream.hosts.len(),
        max_retries = ?config.retry.max_retries,
        max_backoff_ms = ?config.retry.max_backoff_ms,
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
