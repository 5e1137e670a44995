//! Error types for `crs-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid WKT identifier {0:?}: expected <authority>:<version>:<code>")]
  InvalidWktId(String),

  #[error("invalid version {0:?}: expected an integer")]
  MalformedVersion(String),

  #[error("version {0} is out of range: must be greater than 2014")]
  VersionOutOfRange(i64),

  #[error("limit {0} is out of range: must be between 0 and 100")]
  LimitOutOfRange(i64),

  #[error("offset {0} is out of range: must be positive or zero")]
  NegativeOffset(i64),

  #[error("cannot derive a solar body for {0}: datum name is blank")]
  BlankDatumName(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
