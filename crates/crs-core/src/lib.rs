//! Core types and trait definitions for the planetary CRS registry.
//!
//! This crate is free of HTTP and database dependencies. The SQLite backend,
//! the WKT dataset reader and the JSON API all build on these types.

// Native `async fn` in traits; the returned futures are bounded explicitly.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod page;
pub mod record;
pub mod store;

pub use error::{Error, Result};
pub use page::Page;
pub use record::{NewWkt, VersionId, WktId, WktRecord, derive_solar_body};
