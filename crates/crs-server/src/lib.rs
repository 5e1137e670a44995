//! Application lifecycle for the planetary CRS registry server.
//!
//! [`App::initialize`] opens the SQLite store and makes sure the catalog is
//! loaded before anything is served; [`App::router`] builds the HTTP surface;
//! [`App::shutdown`] releases the database connection once serving stops.

pub mod error;
pub mod loader;

pub use error::{Error, Result};
pub use loader::{LoadOutcome, load_catalog, load_catalog_file};

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use crs_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `PLANET_CRS_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:         String,
  pub port:         u16,
  /// SQLite database file; created on first start.
  pub store_path:   PathBuf,
  /// Reference dataset of WKT2 definitions.
  pub dataset_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:         "127.0.0.1".to_string(),
      port:         8080,
      store_path:   PathBuf::from("crs.db"),
      dataset_path: PathBuf::from("data/result.wkts"),
    }
  }
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under the environment.
  pub fn load(path: &Path) -> Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("PLANET_CRS").try_parsing(true))
      .build()?;

    let mut cfg: ServerConfig = settings.try_deserialize()?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    cfg.dataset_path = expand_tilde(&cfg.dataset_path);
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Lifecycle ────────────────────────────────────────────────────────────────

/// A started application: an open store holding a complete catalog.
pub struct App {
  store:   SqliteStore,
  config:  Arc<ServerConfig>,
  outcome: LoadOutcome,
}

impl App {
  /// Open the store and load the catalog. Must complete before the server
  /// accepts connections; any error here aborts startup.
  pub async fn initialize(config: ServerConfig) -> Result<Self> {
    let store = SqliteStore::open(&config.store_path)
      .await
      .map_err(Error::store)?;
    tracing::info!(store = ?config.store_path, "store opened");

    let outcome = load_catalog_file(&store, &config.dataset_path).await?;

    Ok(Self {
      store,
      config: Arc::new(config),
      outcome,
    })
  }

  /// The HTTP surface, with request tracing.
  pub fn router(&self) -> Router {
    crs_api::api_router(Arc::new(self.store.clone())).layer(TraceLayer::new_for_http())
  }

  pub fn config(&self) -> &ServerConfig { &self.config }

  pub fn outcome(&self) -> LoadOutcome { self.outcome }

  /// Close the database connection. Call after the server has drained.
  pub async fn shutdown(self) -> Result<()> {
    self.store.close().await.map_err(Error::store)?;
    tracing::info!("store closed");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use tower::ServiceExt as _;

  const DATASET: &str = include_str!("../../../data/result.wkts");

  fn config_in(dir: &Path) -> ServerConfig {
    let dataset_path = dir.join("result.wkts");
    std::fs::write(&dataset_path, DATASET).unwrap();
    ServerConfig {
      store_path: dir.join("crs.db"),
      dataset_path,
      ..ServerConfig::default()
    }
  }

  async fn get(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or_default())
  }

  #[tokio::test]
  async fn first_start_loads_then_restart_skips() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_in(dir.path());

    let app = App::initialize(cfg.clone()).await.unwrap();
    assert_eq!(app.outcome(), LoadOutcome::Loaded { inserted: 8 });
    app.shutdown().await.unwrap();

    let app = App::initialize(cfg).await.unwrap();
    assert_eq!(app.outcome(), LoadOutcome::Skipped { records: 8 });
    app.shutdown().await.unwrap();
  }

  #[tokio::test]
  async fn router_serves_loaded_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let app = App::initialize(config_in(dir.path())).await.unwrap();

    let (status, count) = get(app.router(), "/wkts/count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count, 8);

    let (_, bodies) = get(app.router(), "/solar_bodies").await;
    assert_eq!(
      bodies,
      serde_json::json!(["Io", "Mars", "Mercury", "Moon", "Sun", "Venus"])
    );

    let (status, wkt) = get(app.router(), "/solar_bodies/MARS/IAU:2015:49910").await;
    assert_eq!(status, StatusCode::OK);
    assert!(wkt.as_str().unwrap().starts_with("PROJCRS["));

    app.shutdown().await.unwrap();
  }

  #[tokio::test]
  async fn broken_dataset_aborts_startup() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config_in(dir.path());
    cfg.dataset_path = dir.path().join("broken.wkts");
    std::fs::write(&cfg.dataset_path, "GEOGCRS[\"x\",ID[\"IAU\",1,2015]]").unwrap();

    assert!(matches!(
      App::initialize(cfg).await,
      Err(Error::Dataset(_))
    ));
  }

  #[test]
  fn config_defaults_without_file() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/config.toml")).unwrap();
    assert_eq!(cfg.port, ServerConfig::default().port);
    assert_eq!(cfg.address(), format!("{}:{}", cfg.host, cfg.port));
  }

  #[test]
  fn config_reads_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = 9191\ndataset_path = \"/srv/iau.wkts\"\n").unwrap();

    let cfg = ServerConfig::load(&path).unwrap();
    assert_eq!(cfg.port, 9191);
    assert_eq!(cfg.dataset_path, PathBuf::from("/srv/iau.wkts"));
    assert_eq!(cfg.store_path, PathBuf::from("crs.db"));
  }
}
