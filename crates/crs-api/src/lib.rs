//! Read-only JSON API for the planetary CRS registry.
//!
//! Exposes an axum [`Router`] backed by any [`crs_core::store::CatalogStore`].
//! Every route is a `GET`; the catalog cannot be modified over HTTP.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = axum::Router::new().merge(crs_api::api_router(store.clone()));
//! ```

pub mod error;
pub mod params;
pub mod search;
pub mod solar_bodies;
pub mod versions;
pub mod wkts;

use std::sync::Arc;

use axum::{Router, routing::get};
use crs_core::store::CatalogStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CatalogStore + 'static,
{
  Router::new()
    // Browse by WKT
    .route("/wkts", get(wkts::list::<S>))
    .route("/wkts/count", get(wkts::count::<S>))
    .route("/wkts/{wkt_id}", get(wkts::get_one::<S>))
    // Browse by version
    .route("/versions", get(versions::list::<S>))
    .route("/versions/{version_id}", get(versions::get_one::<S>))
    .route("/versions/{version_id}/count", get(versions::count::<S>))
    .route("/versions/{version_id}/{wkt_id}", get(versions::get_wkt::<S>))
    // Browse by solar body
    .route("/solar_bodies", get(solar_bodies::list::<S>))
    .route("/solar_bodies/count", get(solar_bodies::count_all::<S>))
    .route("/solar_bodies/{solar_body}", get(solar_bodies::get_one::<S>))
    .route("/solar_bodies/{solar_body}/count", get(solar_bodies::count::<S>))
    .route("/solar_bodies/{solar_body}/{wkt_id}", get(solar_bodies::get_wkt::<S>))
    // Search
    .route("/search", get(search::handler::<S>))
    .route("/search/count", get(search::count::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────
