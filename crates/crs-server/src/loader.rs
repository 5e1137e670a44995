//! One-shot population of the catalog from the reference dataset.
//!
//! Completeness is decided by the sentinel the store writes alongside the
//! records, not by the existence of the database file: a store whose sentinel
//! agrees with its row count is left untouched, anything else is (re)loaded
//! with an idempotent, atomic ingest.

use std::path::Path;

use chrono::Utc;
use crs_core::store::{CatalogLoader, CatalogStore, LoadState};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// What [`load_catalog`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
  /// The dataset was parsed and `inserted` new rows were written.
  Loaded { inserted: u64 },
  /// The store was already complete; nothing was parsed or written.
  Skipped { records: u64 },
}

/// SHA-256 of the dataset, hex-encoded.
pub fn dataset_digest(bytes: &[u8]) -> String { hex::encode(Sha256::digest(bytes)) }

/// Returns the existing record count if the store holds a complete catalog.
async fn complete_catalog<S>(store: &S) -> Result<Option<(LoadState, u64)>>
where
  S: CatalogStore + CatalogLoader,
{
  let Some(state) = CatalogLoader::load_state(store)
    .await
    .map_err(Error::store)?
  else {
    return Ok(None);
  };
  let records = CatalogStore::count(store).await.map_err(Error::store)?;
  if records == state.record_count {
    Ok(Some((state, records)))
  } else {
    tracing::warn!(
      expected = state.record_count,
      found = records,
      "catalog sentinel disagrees with row count; reloading"
    );
    Ok(None)
  }
}

/// Ensure `store` holds the catalog described by `dataset`.
pub async fn load_catalog<S>(store: &S, dataset: &str) -> Result<LoadOutcome>
where
  S: CatalogStore + CatalogLoader,
{
  let digest = dataset_digest(dataset.as_bytes());

  if let Some((state, records)) = complete_catalog(store).await? {
    if state.dataset_digest != digest {
      tracing::warn!(
        loaded = %state.dataset_digest,
        current = %digest,
        "dataset changed since the catalog was loaded; keeping the existing catalog"
      );
    }
    tracing::info!(records, loaded_at = %state.loaded_at, "catalog already loaded");
    return Ok(LoadOutcome::Skipped { records });
  }

  let records = crs_wkt::read_dataset(dataset)?;
  tracing::info!(records = records.len(), "dataset parsed");

  let state = LoadState {
    dataset_digest: digest,
    record_count:   records.len() as u64,
    loaded_at:      Utc::now(),
  };
  let inserted = store.ingest(records, state).await.map_err(Error::store)?;
  tracing::info!(inserted, "catalog loaded");

  Ok(LoadOutcome::Loaded { inserted })
}

/// [`load_catalog`] reading the dataset from `path`.
///
/// A complete store is never reloaded, so the dataset file is only required
/// when loading actually happens.
pub async fn load_catalog_file<S>(store: &S, path: &Path) -> Result<LoadOutcome>
where
  S: CatalogStore + CatalogLoader,
{
  match tokio::fs::read_to_string(path).await {
    Ok(dataset) => load_catalog(store, &dataset).await,
    Err(source) => match complete_catalog(store).await? {
      Some((_, records)) => {
        tracing::warn!(?path, error = %source, "dataset unreadable; serving the loaded catalog");
        Ok(LoadOutcome::Skipped { records })
      }
      None => Err(Error::Io {
        path: path.to_path_buf(),
        source,
      }),
    },
  }
}

#[cfg(test)]
mod tests {
  use crs_core::Page;
  use crs_store_sqlite::SqliteStore;

  use super::*;

  const DATASET: &str = include_str!("../../../data/result.wkts");

  async fn store() -> SqliteStore { SqliteStore::open_in_memory().await.unwrap() }

  #[test]
  fn digest_is_stable_hex() {
    let d = dataset_digest(b"abc");
    assert_eq!(d, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
  }

  #[tokio::test]
  async fn loads_every_definition() {
    let s = store().await;
    let outcome = load_catalog(&s, DATASET).await.unwrap();
    assert_eq!(outcome, LoadOutcome::Loaded { inserted: 8 });

    let state = s.load_state().await.unwrap().unwrap();
    assert_eq!(state.record_count, 8);
    assert_eq!(state.dataset_digest, dataset_digest(DATASET.as_bytes()));
  }

  #[tokio::test]
  async fn every_record_is_retrievable_by_derived_id() {
    let s = store().await;
    load_catalog(&s, DATASET).await.unwrap();

    for expected in crs_wkt::read_dataset(DATASET).unwrap() {
      let found = s.find_by_id(&expected.id).await.unwrap().unwrap();
      assert_eq!(found, expected);
    }
  }

  #[tokio::test]
  async fn second_run_is_a_no_op() {
    let s = store().await;
    load_catalog(&s, DATASET).await.unwrap();
    let before = s.list(Page { limit: 100, offset: 0 }).await.unwrap();
    let state_before = s.load_state().await.unwrap();

    let outcome = load_catalog(&s, DATASET).await.unwrap();
    assert_eq!(outcome, LoadOutcome::Skipped { records: 8 });
    assert_eq!(s.list(Page { limit: 100, offset: 0 }).await.unwrap(), before);
    assert_eq!(s.load_state().await.unwrap(), state_before);
  }

  #[tokio::test]
  async fn changed_dataset_keeps_existing_catalog() {
    let s = store().await;
    load_catalog(&s, DATASET).await.unwrap();

    let outcome = load_catalog(&s, "GEOGCRS[\"x\",DATUM[\"Pluto\"],ID[\"IAU\",99900,2015]]")
      .await
      .unwrap();
    assert_eq!(outcome, LoadOutcome::Skipped { records: 8 });
    assert!(s.find_by_id("IAU:2015:99900").await.unwrap().is_none());
  }

  /// Run raw SQL against a closed on-disk store, outside the loader.
  fn tamper(db: &Path, sql: &str) {
    rusqlite::Connection::open(db).unwrap().execute_batch(sql).unwrap();
  }

  #[tokio::test]
  async fn rows_without_sentinel_are_topped_up() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("crs.db");

    // An interrupted first start: some rows written, no sentinel.
    let s = SqliteStore::open(&db).await.unwrap();
    let partial: Vec<_> = crs_wkt::read_dataset(DATASET).unwrap().into_iter().take(3).collect();
    s.ingest(partial, LoadState {
      dataset_digest: dataset_digest(DATASET.as_bytes()),
      record_count:   3,
      loaded_at:      Utc::now(),
    })
    .await
    .unwrap();
    s.close().await.unwrap();
    tamper(&db, "DELETE FROM catalog_meta;");

    let s = SqliteStore::open(&db).await.unwrap();
    assert_eq!(s.count().await.unwrap(), 3);
    assert!(s.load_state().await.unwrap().is_none());

    let outcome = load_catalog(&s, DATASET).await.unwrap();
    assert_eq!(outcome, LoadOutcome::Loaded { inserted: 5 });
    assert_eq!(s.load_state().await.unwrap().unwrap().record_count, 8);

    let outcome = load_catalog(&s, DATASET).await.unwrap();
    assert_eq!(outcome, LoadOutcome::Skipped { records: 8 });
    s.close().await.unwrap();
  }

  #[tokio::test]
  async fn sentinel_disagreeing_with_rows_triggers_reload() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("crs.db");

    let s = SqliteStore::open(&db).await.unwrap();
    load_catalog(&s, DATASET).await.unwrap();
    s.close().await.unwrap();
    tamper(&db, "DELETE FROM wkts WHERE id = 'IAU:2015:50100';");

    let s = SqliteStore::open(&db).await.unwrap();
    assert_eq!(s.count().await.unwrap(), 7);

    let outcome = load_catalog(&s, DATASET).await.unwrap();
    assert_eq!(outcome, LoadOutcome::Loaded { inserted: 1 });
    assert!(s.find_by_id("IAU:2015:50100").await.unwrap().is_some());

    let outcome = load_catalog(&s, DATASET).await.unwrap();
    assert_eq!(outcome, LoadOutcome::Skipped { records: 8 });
    s.close().await.unwrap();
  }

  #[tokio::test]
  async fn malformed_dataset_is_fatal_and_writes_nothing() {
    let s = store().await;
    let err = load_catalog(&s, "GEOGCRS[\"x\",DATUM[\"Mars\"]").await.unwrap_err();
    assert!(matches!(err, Error::Dataset(_)));
    assert_eq!(s.count().await.unwrap(), 0);
    assert!(s.load_state().await.unwrap().is_none());
  }

  #[tokio::test]
  async fn missing_file_is_fatal_for_empty_store() {
    let s = store().await;
    let err = load_catalog_file(&s, Path::new("/nonexistent/result.wkts"))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
  }

  #[tokio::test]
  async fn missing_file_is_tolerated_once_loaded() {
    let s = store().await;
    load_catalog(&s, DATASET).await.unwrap();
    let outcome = load_catalog_file(&s, Path::new("/nonexistent/result.wkts"))
      .await
      .unwrap();
    assert_eq!(outcome, LoadOutcome::Skipped { records: 8 });
  }
}
