//! The `CatalogStore` and `CatalogLoader` traits.
//!
//! `CatalogStore` is the read-only repository the HTTP layer talks to.
//! `CatalogLoader` is the write side, used once at startup to populate the
//! catalog. Backends (e.g. `crs-store-sqlite`) implement both; higher layers
//! depend on these abstractions, not on a concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{page::Page, record::WktRecord};

// ─── Load sentinel ───────────────────────────────────────────────────────────

/// Written in the same transaction as the records it describes. Its presence
/// (with a matching row count) marks the catalog as completely loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadState {
  /// SHA-256 (hex) of the dataset the catalog was loaded from.
  pub dataset_digest: String,
  pub record_count:   u64,
  pub loaded_at:      DateTime<Utc>,
}

// ─── Read side ───────────────────────────────────────────────────────────────

/// Read access to the immutable WKT catalog.
///
/// Listings are ordered by insertion. All methods return `Send` futures so
/// the trait can back an `axum` router on a multi-threaded runtime.
pub trait CatalogStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Whole catalog ─────────────────────────────────────────────────────

  fn list(
    &self,
    page: Page,
  ) -> impl Future<Output = Result<Vec<WktRecord>, Self::Error>> + Send + '_;

  fn count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Retrieve a record by identifier. Returns `None` if not found.
  fn find_by_id<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<WktRecord>, Self::Error>> + Send + 'a;

  // ── Versions ──────────────────────────────────────────────────────────

  /// Sorted, distinct versions present in the catalog.
  fn versions(&self) -> impl Future<Output = Result<Vec<i64>, Self::Error>> + Send + '_;

  fn list_by_version(
    &self,
    version: i64,
    page: Page,
  ) -> impl Future<Output = Result<Vec<WktRecord>, Self::Error>> + Send + '_;

  fn count_by_version(
    &self,
    version: i64,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Solar bodies ──────────────────────────────────────────────────────

  /// Sorted, distinct solar bodies present in the catalog.
  fn solar_bodies(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  fn count_solar_bodies(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Records whose solar body matches `body`, ignoring case.
  fn list_by_solar_body<'a>(
    &'a self,
    body: &'a str,
    page: Page,
  ) -> impl Future<Output = Result<Vec<WktRecord>, Self::Error>> + Send + 'a;

  /// Number of records in the *paginated* slice of `body`'s records, i.e.
  /// `min(limit, max(0, total - offset))`, not the full filtered total.
  fn count_by_solar_body<'a>(
    &'a self,
    body: &'a str,
    page: Page,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  // ── Keyword search ────────────────────────────────────────────────────

  /// Records matching every whitespace-separated term of `keyword`.
  fn search<'a>(
    &'a self,
    keyword: &'a str,
    page: Page,
  ) -> impl Future<Output = Result<Vec<WktRecord>, Self::Error>> + Send + 'a;

  fn search_count<'a>(
    &'a self,
    keyword: &'a str,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;
}

// ─── Write side ──────────────────────────────────────────────────────────────

/// One-shot population of the catalog.
pub trait CatalogLoader: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The sentinel written by the last successful [`ingest`](Self::ingest).
  fn load_state(
    &self,
  ) -> impl Future<Output = Result<Option<LoadState>, Self::Error>> + Send + '_;

  /// Insert `records` and record `state`, atomically.
  ///
  /// Records whose identifier is already present are left untouched. Returns
  /// the number of rows actually inserted.
  fn ingest(
    &self,
    records: Vec<WktRecord>,
    state: LoadState,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
