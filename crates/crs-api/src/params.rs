//! Query-string and path parameter parsing shared by all handlers.

use std::sync::Arc;

use axum::{
  extract::{FromRequestParts, Query},
  http::request::Parts,
};
use crs_core::{Page, VersionId, WktId, WktRecord, store::CatalogStore};
use serde::{Deserialize, de::DeserializeOwned};

use crate::error::ApiError;

/// [`Query`] whose rejection is reported as an [`ApiError`], so a malformed
/// query string gets the same JSON error body as every other failure.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
  T: DeserializeOwned + Send,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
    let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
    Ok(ApiQuery(value))
  }
}

/// `?limit=<0..=100>&offset=<0..>`, both optional.
#[derive(Debug, Deserialize, Default)]
pub struct PageParams {
  /// Number of records to return. Defaults to 50.
  pub limit:  Option<i64>,
  /// Number of records to skip. Defaults to 0.
  pub offset: Option<i64>,
}

impl PageParams {
  pub fn page(&self) -> Result<Page, ApiError> { Ok(Page::new(self.limit, self.offset)?) }
}

/// Validate a `{version_id}` path segment.
pub fn version_id(raw: &str) -> Result<VersionId, ApiError> { Ok(raw.parse()?) }

/// Validate a `{wkt_id}` path segment (`<anything>:<digits>:<digits>`).
pub fn wkt_id(raw: &str) -> Result<WktId, ApiError> { Ok(raw.parse()?) }

/// Look up a record by a validated identifier; 404 if it does not exist.
pub async fn fetch<S>(store: &Arc<S>, id: &WktId) -> Result<WktRecord, ApiError>
where
  S: CatalogStore,
{
  store
    .find_by_id(id.as_str())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("{id} not found")))
}
