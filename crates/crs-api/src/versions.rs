//! Handlers for `/versions` endpoints.
//!
//! `{version_id}` must be an IAU report year after 2014. Non-integers are
//! rejected with 422 and earlier years with 400, before the store is queried.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use crs_core::{WktRecord, store::CatalogStore};

use crate::{
  error::ApiError,
  params::{ApiQuery, PageParams, fetch, version_id, wkt_id},
};

/// `GET /versions`: sorted distinct versions.
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<i64>>, ApiError>
where
  S: CatalogStore,
{
  let versions = store.versions().await.map_err(ApiError::store)?;
  Ok(Json(versions))
}

/// `GET /versions/{version_id}[?limit=...][&offset=...]`: 404 if the page
/// is empty.
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(raw_version): Path<String>,
  ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<Vec<WktRecord>>, ApiError>
where
  S: CatalogStore,
{
  let version = version_id(&raw_version)?;
  let records = store
    .list_by_version(version.get(), params.page()?)
    .await
    .map_err(ApiError::store)?;

  if records.is_empty() {
    return Err(ApiError::NotFound(format!("{version} not found")));
  }
  Ok(Json(records))
}

/// `GET /versions/{version_id}/count`
pub async fn count<S>(
  State(store): State<Arc<S>>,
  Path(raw_version): Path<String>,
) -> Result<Json<u64>, ApiError>
where
  S: CatalogStore,
{
  let version = version_id(&raw_version)?;
  let n = store
    .count_by_version(version.get())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(n))
}

/// `GET /versions/{version_id}/{wkt_id}`: 404 if the identifier is unknown,
/// 400 if the record belongs to another version.
pub async fn get_wkt<S>(
  State(store): State<Arc<S>>,
  Path((raw_version, raw_id)): Path<(String, String)>,
) -> Result<Json<String>, ApiError>
where
  S: CatalogStore,
{
  let version = version_id(&raw_version)?;
  let id = wkt_id(&raw_id)?;

  let record = fetch(&store, &id).await?;
  if record.version != version.get() {
    return Err(ApiError::BadRequest(format!(
      "Wrong version {version} for this WKT {id}"
    )));
  }
  Ok(Json(record.wkt))
}
