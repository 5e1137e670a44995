//! planet-crs-registry server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), loads the WKT
//! catalog into SQLite on first start, and serves the read-only JSON API.
//!
//! # Checking a dataset
//!
//! ```text
//! cargo run -p crs-server -- --check-dataset
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use crs_server::{App, ServerConfig};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Coordinate reference system registry for solar bodies")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Parse the configured dataset, print its record count and exit.
  #[arg(long)]
  check_dataset: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to read configuration from {:?}", cli.config))?;

  // Helper mode: validate the dataset and exit.
  if cli.check_dataset {
    let path = &server_cfg.dataset_path;
    let dataset = tokio::fs::read_to_string(path)
      .await
      .with_context(|| format!("failed to read dataset {path:?}"))?;
    let records = crs_wkt::read_dataset(&dataset)
      .with_context(|| format!("invalid dataset {path:?}"))?;
    println!("{} records", records.len());
    return Ok(());
  }

  let app = App::initialize(server_cfg)
    .await
    .context("startup failed")?;

  let address = app.config().address();
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("Listening on http://{address}");

  axum::serve(listener, app.router())
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  app.shutdown().await.context("shutdown failed")?;
  Ok(())
}

/// Resolve on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(error = %e, "cannot listen for Ctrl-C");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        tracing::error!(error = %e, "cannot listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
  tracing::info!("shutdown requested");
}
