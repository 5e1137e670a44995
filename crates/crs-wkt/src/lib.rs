//! WKT2 reader for the planetary CRS registry.
//!
//! [`parse`] turns one WKT2 definition into a bracket tree of [`Node`]s.
//! [`read_dataset`] splits a reference dataset into entries and builds one
//! [`WktRecord`](crs_core::WktRecord) per entry. Pure synchronous; no I/O.
//!
//! ```no_run
//! let text = std::fs::read_to_string("data/result.wkts").unwrap();
//! let records = crs_wkt::read_dataset(&text).unwrap();
//! println!("{} definitions", records.len());
//! ```

mod dataset;
pub mod error;
mod parse;

pub use dataset::{read_dataset, split_entries, RawEntry};
pub use error::{Error, Result};
pub use parse::{Node, Value, parse};
