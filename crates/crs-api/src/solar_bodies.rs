//! Handlers for `/solar_bodies` endpoints.
//!
//! Solar body path segments are matched case-insensitively.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use crs_core::{WktRecord, store::CatalogStore};

use crate::{
  error::ApiError,
  params::{ApiQuery, PageParams, fetch, wkt_id},
};

/// `GET /solar_bodies`: sorted distinct bodies.
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<String>>, ApiError>
where
  S: CatalogStore,
{
  let bodies = store.solar_bodies().await.map_err(ApiError::store)?;
  Ok(Json(bodies))
}

/// `GET /solar_bodies/count`
pub async fn count_all<S>(State(store): State<Arc<S>>) -> Result<Json<u64>, ApiError>
where
  S: CatalogStore,
{
  let n = store.count_solar_bodies().await.map_err(ApiError::store)?;
  Ok(Json(n))
}

/// `GET /solar_bodies/{solar_body}[?limit=...][&offset=...]`: 404 if the
/// page is empty.
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(solar_body): Path<String>,
  ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<Vec<WktRecord>>, ApiError>
where
  S: CatalogStore,
{
  let records = store
    .list_by_solar_body(&solar_body, params.page()?)
    .await
    .map_err(ApiError::store)?;

  if records.is_empty() {
    return Err(ApiError::NotFound(format!("{solar_body} not found")));
  }
  Ok(Json(records))
}

/// `GET /solar_bodies/{solar_body}/count[?limit=...][&offset=...]`
///
/// The window is applied before counting, so the result is the size of the
/// requested page rather than the body's total.
pub async fn count<S>(
  State(store): State<Arc<S>>,
  Path(solar_body): Path<String>,
  ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<u64>, ApiError>
where
  S: CatalogStore,
{
  let n = store
    .count_by_solar_body(&solar_body, params.page()?)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(n))
}

/// `GET /solar_bodies/{solar_body}/{wkt_id}`: 404 if the identifier is
/// unknown, 400 if the record belongs to another body.
pub async fn get_wkt<S>(
  State(store): State<Arc<S>>,
  Path((solar_body, raw_id)): Path<(String, String)>,
) -> Result<Json<String>, ApiError>
where
  S: CatalogStore,
{
  let id = wkt_id(&raw_id)?;
  let record = fetch(&store, &id).await?;
  if !record.is_on(&solar_body) {
    return Err(ApiError::BadRequest(format!("{id} not found for {solar_body}")));
  }
  Ok(Json(record.wkt))
}
