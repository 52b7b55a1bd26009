//! kvas-wui - management daemon for the kvas router tool
//!
//! Runs kvas on demand, turns its console output into JSON for the web
//! dashboard, and serves the dashboard itself.

mod api;
mod command;
mod config;
mod error;
mod metrics;
mod models;
mod parser;
mod static_files;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kvas-wui")]
#[command(about = "JSON API and web UI server for kvas", long_about = None)]
struct Args {
    /// Config file path (default: search kvas-wui.toml, /opt/etc/kvas-wui/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the API listen address
    #[arg(long)]
    api_addr: Option<SocketAddr>,

    /// Do not serve the web UI
    #[arg(long)]
    no_static: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut cfg = config::Config::load(args.config.as_deref())?;
    if let Some(addr) = args.api_addr {
        cfg.server.api_addr = addr;
    }
    if args.no_static {
        cfg.server.serve_static = false;
    }

    init_logging(&cfg.logging)?;

    tracing::info!("kvas-wui v{}", env!("CARGO_PKG_VERSION"));

    let metrics = metrics::HostMetrics::new(&cfg.metrics);
    tracing::debug!("Reading host metrics from {}", metrics.proc_root().display());

    let state = Arc::new(api::AppState {
        runner: Arc::new(command::ShellRunner::new(&cfg.command)),
        commands: cfg.command.clone(),
        metrics,
    });

    if cfg.server.serve_static {
        let app = static_files::router(&cfg.server.static_dir, &cfg.server.index_file);
        let listener = tokio::net::TcpListener::bind(cfg.server.static_addr)
            .await
            .with_context(|| format!("Failed to bind static server to {}", cfg.server.static_addr))?;
        tracing::info!(
            "Static file server started on {} ({})",
            cfg.server.static_addr,
            cfg.server.static_dir.display()
        );
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Static server failed: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(cfg.server.api_addr)
        .await
        .with_context(|| format!("Failed to bind API server to {}", cfg.server.api_addr))?;
    tracing::info!("API server started on {}", cfg.server.api_addr);

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    tracing::info!("Shutting down");
    Ok(())
}

/// Initialize logging to stderr, or to `log_file` when one is configured
fn init_logging(cfg: &config::LoggingConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));

    if cfg.log_file.is_empty() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return Ok(());
    }

    let path = Path::new(&cfg.log_file);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
