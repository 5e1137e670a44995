//! Error types for the WKT parser and dataset reader.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("line {line}: {message}")]
  Syntax { line: usize, message: String },

  #[error("entry {index} at line {line}: {reason}")]
  InvalidEntry {
    index:  usize,
    line:   usize,
    reason: String,
  },

  #[error("entry {index} at line {line}: {source}")]
  Record {
    index:  usize,
    line:   usize,
    #[source]
    source: crs_core::Error,
  },

  #[error("duplicate identifier {id} in entries {first} and {second}")]
  DuplicateId {
    id:     String,
    first:  usize,
    second: usize,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
