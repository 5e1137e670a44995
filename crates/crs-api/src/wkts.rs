//! Handlers for `/wkts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/wkts` | Optional `?limit`, `?offset` |
//! | `GET`  | `/wkts/count` | Total number of records |
//! | `GET`  | `/wkts/{wkt_id}` | The raw WKT text; 404 if not found |

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

/// `GET /wkts[?limit=...][&offset=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<Vec<WktRecord>>, ApiError>
where
  S: CatalogStore,
{
  let records = store
    .list(params.page()?)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(records))
}

/// `GET /wkts/count`
pub async fn count<S>(State(store): State<Arc<S>>) -> Result<Json<u64>, ApiError>
where
  S: CatalogStore,
{
  let n = store.count().await.map_err(ApiError::store)?;
  Ok(Json(n))
}

/// `GET /wkts/{wkt_id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(raw_id): Path<String>,
) -> Result<Json<String>, ApiError>
where
  S: CatalogStore,
{
  let id = wkt_id(&raw_id)?;
  let record = fetch(&store, &id).await?;
  Ok(Json(record.wkt))
}
