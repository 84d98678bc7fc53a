//! `dashboard` binary.
//!
//! Reads `dashboard.toml` (or the path given with `--config`) plus `CYTO_*`
//! environment variables, opens an existing cytometry store, and serves the
//! dashboard over HTTP. Run `cytometry` first to build the store.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use cyto_dashboard::{AppState, DashboardConfig};
use cyto_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Cytometry analysis dashboard")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "dashboard.toml")]
  config: PathBuf,
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

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("CYTO"))
    .build()
    .context("failed to read config file")?;

  let dashboard_cfg: DashboardConfig = settings
    .try_deserialize()
    .context("failed to deserialise DashboardConfig")?;

  // Opening a missing path would silently create an empty store.
  anyhow::ensure!(
    dashboard_cfg.store_path.is_file(),
    "store {} not found; run `cytometry` to load the data first",
    dashboard_cfg.store_path.display()
  );

  let store = SqliteStore::open_read_only(&dashboard_cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", dashboard_cfg.store_path))?;

  tracing::info!(cohort = %dashboard_cfg.cohort().describe(), "default cohort");

  let address = dashboard_cfg.address();
  let state = AppState { store: Arc::new(store), config: Arc::new(dashboard_cfg) };
  let app = cyto_dashboard::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
