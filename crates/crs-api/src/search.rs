//! Handlers for `GET /search` and `GET /search/count`.
//!
//! `search_term_kw` is split on whitespace; a record matches when every term
//! occurs in its identifier, solar body, datum, ellipsoid or projection name.

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
};
use crs_core::{Page, WktRecord, store::CatalogStore};
use serde::Deserialize;

use crate::{error::ApiError, params::ApiQuery};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub search_term_kw: String,
  pub limit:          Option<i64>,
  pub offset:         Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CountParams {
  pub search_term_kw: String,
}

/// `GET /search?search_term_kw=...[&limit=...][&offset=...]`: 404 when the
/// page is empty.
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<Vec<WktRecord>>, ApiError>
where
  S: CatalogStore,
{
  let page = Page::new(params.limit, params.offset)?;
  let records = store
    .search(&params.search_term_kw, page)
    .await
    .map_err(ApiError::store)?;

  if records.is_empty() {
    return Err(ApiError::NotFound(format!(
      "no WKT matching {}",
      params.search_term_kw
    )));
  }
  Ok(Json(records))
}

/// `GET /search/count?search_term_kw=...`
pub async fn count<S>(
  State(store): State<Arc<S>>,
  ApiQuery(params): ApiQuery<CountParams>,
) -> Result<Json<u64>, ApiError>
where
  S: CatalogStore,
{
  let n = store
    .search_count(&params.search_term_kw)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(n))
}
