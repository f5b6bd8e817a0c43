use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pagestats::config::{PageKind, PagestatsConfig};
use pagestats::http::{AppState, HttpServer};
use pagestats::stats::CounterStore;

#[derive(Debug, Parser)]
#[command(name = "pagestats", version, about = "Single-page web tools with page view statistics")]
struct Cli {
    /// Path to a YAML or TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP listen address, overrides the configuration
    #[arg(long)]
    http_addr: Option<SocketAddr>,

    /// Page served at `/`, overrides the configuration
    #[arg(long, value_enum)]
    page: Option<PageKind>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_format);

    info!("Starting Pagestats");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // `rediss://` connections need a process-wide rustls provider.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let mut config = PagestatsConfig::load(cli.config.as_deref())?;
    if let Some(addr) = cli.http_addr {
        config.server.http_addr = addr;
    }
    if let Some(page) = cli.page {
        config.page.kind = page;
    }
    info!(
        http_addr = %config.server.http_addr,
        page = ?config.page.kind,
        key_prefix = %config.storage.key_prefix,
        "Configuration loaded"
    );

    // Redis is probed on the first request, not here.
    let store = Arc::new(CounterStore::new(&config.storage));
    let state = AppState::new(store, config.page.kind);

    let server = HttpServer::new(
        config.server.http_addr,
        state,
        config.server.request_timeout(),
    );
    server.serve_with_shutdown(shutdown_signal()).await?;

    info!("Pagestats stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
